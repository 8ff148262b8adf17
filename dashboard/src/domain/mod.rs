//! Domain primitives and services for the dashboard data layer.
//!
//! Purpose: describe outbound API calls, session state and failures without
//! depending on any HTTP client or web framework. Adapters in `outbound` and
//! `inbound` implement or drive the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: normalized failure returned by every data operation.
//! - ApiRequest / ApiResponse: transport-neutral request records.
//! - TokenExpiryChecker, TokenRefreshService: pre-emptive refresh.
//! - ClientAuthProvider / ServerAuthProvider: auth headers per context.
//! - AuthenticatedFetch, unwrap_response: the fetch/unwrap pair.
//! - ResourceActions, AuthService: collaborator operations.
//! - normalize_error_message: message extraction for any failure.

pub mod auth;
pub mod auth_provider;
pub mod auth_service;
pub mod authenticated_fetch;
pub mod error;
pub mod error_context;
pub mod error_message;
pub mod http;
pub mod login_redirect;
pub mod ports;
pub mod resource_actions;
pub mod response;
pub mod session;
pub mod token_expiry;
pub mod token_refresh;
pub mod trace_id;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::auth_provider::{ClientAuthProvider, ServerAuthProvider};
pub use self::auth_service::{AuthService, LOGIN_ENDPOINT};
pub use self::authenticated_fetch::AuthenticatedFetch;
pub use self::error::{Error, ErrorCode};
pub use self::error_context::ErrorContext;
pub use self::error_message::{
    ApiErrorShape, ErrorInput, ErrorNormalizer, NETWORK_ERROR_MESSAGE, UNKNOWN_ERROR_MESSAGE,
    normalize_error_message, status_fallback_message,
};
pub use self::http::{ApiRequest, ApiResponse, HttpMethod};
pub use self::login_redirect::{DEFAULT_LOGIN_PATH, LoginRedirect, LoginRoute, RedirectReason};
pub use self::resource_actions::{ListQuery, ResourceActions, ResourceName, ResourcePathError};
pub use self::response::{INVALID_JSON_MESSAGE, unwrap_response};
pub use self::session::{SessionToken, SessionTokenError, TOKEN_COOKIE, USER_COOKIE, UserProfile};
pub use self::token_expiry::{DEFAULT_EXPIRY_THRESHOLD_SECONDS, TokenExpiryChecker, TokenStatus};
pub use self::token_refresh::{REFRESH_ENDPOINT, RefreshOutcome, TokenRefreshService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use dashboard::domain::{ApiResult, Error};
///
/// fn lookup(id: &str) -> ApiResult<String> {
///     if id.is_empty() {
///         return Err(Error::invalid_request("id must not be empty"));
///     }
///     Ok(id.to_owned())
/// }
/// assert!(lookup("").is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
