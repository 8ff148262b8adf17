//! Authenticated fetch wrapper.
//!
//! Every outward data operation goes through [`AuthenticatedFetch`]. Header
//! construction, including any token refresh it triggers, completes before
//! the request is sent. An upstream 401 ends the session; it is never
//! retried.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, warn};

use super::error_message::{ErrorInput, normalize_error_message};
use super::ports::{AuthProvider, HttpTransport, HttpTransportError, SessionStore};
use super::response::unwrap_response;
use super::trace_id::{TRACE_ID_HEADER, TraceId};
use super::{ApiRequest, ApiResponse, Error, ErrorContext, LoginRoute};

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
const TIMEOUT_MESSAGE: &str = "The server took too long to respond. Please try again.";

/// Composes an [`AuthProvider`] with an [`HttpTransport`].
#[derive(Clone)]
pub struct AuthenticatedFetch {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn SessionStore>,
    login: LoginRoute,
}

impl AuthenticatedFetch {
    /// Build a wrapper. `store` is the session cleared on an upstream 401.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn SessionStore>,
        login: LoginRoute,
    ) -> Self {
        Self {
            transport,
            auth,
            store,
            login,
        }
    }

    /// Send `request` with auth headers and return the raw response.
    ///
    /// # Errors
    ///
    /// - Any error from the auth provider, unchanged.
    /// - [`ErrorCode::Transport`](super::ErrorCode::Transport) when no
    ///   response was received.
    /// - [`ErrorCode::SessionExpired`](super::ErrorCode::SessionExpired) with
    ///   an `expired` redirect on an upstream 401.
    pub async fn fetch(&self, mut request: ApiRequest) -> Result<ApiResponse, Error> {
        let headers = self.auth.auth_headers().await?;
        headers.apply(&mut request);
        if let Some(trace_id) = TraceId::current() {
            request.set_header(TRACE_ID_HEADER, trace_id.to_string());
        }

        let method = request.method();
        let path = request.path().to_owned();
        let response = self.transport.send(request).await.map_err(|err| {
            let context = ErrorContext::new("authenticated_fetch", path.as_str(), method);
            transport_failure(&err, &context)
        })?;

        if response.status() == 401 {
            warn!(%method, endpoint = %path, "upstream rejected session; clearing");
            if let Err(err) = self.store.clear_session().await {
                warn!(error = %err, "failed to clear session after upstream 401");
            }
            return Err(Error::session_expired(SESSION_EXPIRED_MESSAGE)
                .with_status(401)
                .with_redirect(self.login.expired()));
        }
        Ok(response)
    }

    /// [`fetch`](Self::fetch) followed by [`unwrap_response`].
    ///
    /// `context` labels the call site for diagnostics; its endpoint and method
    /// should describe `request`.
    pub async fn fetch_json(
        &self,
        request: ApiRequest,
        context: &ErrorContext,
        default_message: &str,
    ) -> Result<Value, Error> {
        let response = self.fetch(request).await?;
        unwrap_response(&response, default_message, context)
    }
}

fn transport_failure(err: &HttpTransportError, context: &ErrorContext) -> Error {
    error!(
        method = %context.method(),
        endpoint = context.endpoint(),
        error = %err,
        "request failed before a response was received"
    );
    let message = match err {
        HttpTransportError::Timeout { .. } => TIMEOUT_MESSAGE.to_owned(),
        _ => normalize_error_message(ErrorInput::Error(err), None),
    };
    Error::transport(message)
}

#[cfg(test)]
mod tests;
