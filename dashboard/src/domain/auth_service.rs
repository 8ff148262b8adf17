//! Login and logout against the upstream auth endpoints.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::ports::{HttpTransport, SessionStore, SessionStoreError};
use super::response::unwrap_response;
use super::token_refresh::extract_token;
use super::{
    ApiRequest, Error, ErrorContext, ErrorInput, LoginCredentials, UserProfile,
    normalize_error_message,
};

/// Upstream login endpoint.
pub const LOGIN_ENDPOINT: &str = "/api/auth/login";

const LOGIN_FAILED_MESSAGE: &str = "Login failed. Check your email and password.";

fn store_failure(err: &SessionStoreError) -> Error {
    warn!(error = %err, "session store operation failed");
    Error::internal("Session state could not be saved.")
}

/// Session lifecycle operations.
#[derive(Clone)]
pub struct AuthService {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    /// Build the service.
    pub fn new(transport: Arc<dyn HttpTransport>, store: Arc<dyn SessionStore>) -> Self {
        Self { transport, store }
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::Upstream`](super::ErrorCode::Upstream) when the API
    ///   rejects the credentials.
    /// - [`ErrorCode::InvalidResponse`](super::ErrorCode::InvalidResponse)
    ///   when the reply carries no token.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error> {
        let request = ApiRequest::post(LOGIN_ENDPOINT)
            .no_store()
            .with_header("content-type", "application/json")
            .with_json(credentials.to_request_body());
        let context = ErrorContext::for_request("auth_service::login", &request);

        let response = self.transport.send(request).await.map_err(|err| {
            warn!(error = %err, "login request failed before a response was received");
            Error::transport(normalize_error_message(ErrorInput::Error(&err), None))
        })?;
        let body = unwrap_response(&response, LOGIN_FAILED_MESSAGE, &context)?;

        let token = extract_token(&body)
            .ok_or_else(|| Error::invalid_response("Login response did not include a token."))?;
        let profile = match body.get("user") {
            Some(user @ Value::Object(_)) => UserProfile::from_json(user).map_err(|err| {
                Error::invalid_response(format!("Login response had an unreadable user: {err}"))
            })?,
            _ => UserProfile::default(),
        };

        self.store
            .set_token(&token)
            .await
            .map_err(|err| store_failure(&err))?;
        self.store
            .set_user(&profile)
            .await
            .map_err(|err| store_failure(&err))?;
        info!(token = %token.fingerprint(), "session started");
        Ok(profile)
    }

    /// Drop the local session.
    pub async fn logout(&self) -> Result<(), Error> {
        self.store
            .clear_session()
            .await
            .map_err(|err| store_failure(&err))?;
        info!("session ended by logout");
        Ok(())
    }

    /// Profile stored for the current session.
    pub async fn current_user(&self) -> Result<Option<UserProfile>, Error> {
        self.store.user().await.map_err(|err| {
            warn!(error = %err, "session store read failed");
            Error::internal("Session state could not be read.")
        })
    }
}
