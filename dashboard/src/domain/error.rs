//! Domain-level error type returned by every outward data operation.
//!
//! The `message` is already reduced to a user-displayable string by the
//! error normalizer. Adapters decide how to present it; the gateway maps the
//! [`ErrorCode`] to an HTTP status and follows the attached
//! [`LoginRedirect`] when one is present.

use serde::Serialize;

use super::login_redirect::LoginRedirect;
use super::trace_id::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Caller input failed validation before any I/O.
    InvalidRequest,
    /// No usable session token was available.
    Unauthenticated,
    /// The upstream API rejected the session.
    SessionExpired,
    /// The token needed refreshing and the refresh did not succeed.
    RefreshFailed,
    /// The upstream API answered with a non-2xx status.
    Upstream,
    /// The upstream API answered 2xx with a body that could not be decoded.
    InvalidResponse,
    /// No response was received (DNS, connect, timeout, reset).
    Transport,
    /// An unexpected local failure.
    Internal,
}

/// Normalized error surfaced to callers.
///
/// Captures the current trace identifier, if one is in scope, at construction.
///
/// # Examples
/// ```
/// use dashboard::domain::{Error, ErrorCode, LoginRoute};
///
/// let err = Error::session_expired("Your session has expired.")
///     .with_redirect(LoginRoute::default().expired());
/// assert_eq!(err.code(), ErrorCode::SessionExpired);
/// assert!(err.requires_login());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<LoginRedirect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            redirect: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthenticated`].
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Convenience constructor for [`ErrorCode::SessionExpired`].
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionExpired, message)
    }

    /// Convenience constructor for [`ErrorCode::RefreshFailed`].
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RefreshFailed, message)
    }

    /// Convenience constructor for [`ErrorCode::Upstream`].
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Upstream, message).with_status(status)
    }

    /// Convenience constructor for [`ErrorCode::InvalidResponse`].
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidResponse, message)
    }

    /// Convenience constructor for [`ErrorCode::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Record the upstream status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Ask the caller to navigate to the login screen.
    #[must_use]
    pub fn with_redirect(mut self, redirect: LoginRedirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Attach a trace identifier explicitly.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// User-displayable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Upstream status code, when the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Login navigation the caller should perform, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&LoginRedirect> {
        self.redirect.as_ref()
    }

    /// Correlation identifier captured at construction.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// True when the session is over and the caller must log in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        self.redirect.is_some()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
