//! Exchange the stored session token for a new one.
//!
//! The refresh never navigates. Outcomes that end the session carry a
//! [`LoginRedirect`] for the caller to act on. Concurrent refreshes are not
//! coordinated; the last token written to the store wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::ports::{HttpTransport, SessionStore};
use super::{ApiRequest, LoginRedirect, LoginRoute, SessionToken, UserProfile};

/// Upstream refresh endpoint.
pub const REFRESH_ENDPOINT: &str = "/api/auth/refresh";

/// Response fields that may carry a token, in lookup order.
const TOKEN_FIELDS: [&str; 3] = ["access_token", "token", "accessToken"];

/// Result of a refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token was stored.
    Refreshed(SessionToken),
    /// The session was cleared; the caller should follow the redirect.
    SessionEnded(LoginRedirect),
    /// The refresh did not succeed and the session was left intact.
    Failed {
        /// Upstream status, when a response was received.
        status: Option<u16>,
        /// Diagnostic reason, never shown to end users.
        reason: String,
    },
}

/// Pull the first usable token out of a refresh or login response body.
pub(crate) fn extract_token(body: &Value) -> Option<SessionToken> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .find_map(|raw| SessionToken::new(raw).ok())
}

/// Refresh flow bound to one transport and session store.
#[derive(Clone)]
pub struct TokenRefreshService {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    login: LoginRoute,
}

impl TokenRefreshService {
    /// Create a refresh service.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        login: LoginRoute,
    ) -> Self {
        Self {
            transport,
            store,
            login,
        }
    }

    /// Attempt the refresh.
    ///
    /// No network call is made when the store holds no token.
    pub async fn refresh(&self) -> RefreshOutcome {
        let current = match self.store.token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                return RefreshOutcome::Failed {
                    status: None,
                    reason: "no session token to refresh".to_owned(),
                };
            }
            Err(err) => return self.end_with_error(&err.to_string()).await,
        };

        let request = ApiRequest::post(REFRESH_ENDPOINT)
            .no_store()
            .with_header("authorization", current.bearer());
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => return self.end_with_error(&err.to_string()).await,
        };

        let status = response.status();
        if matches!(status, 401 | 403) {
            return self.end_rejected(&current, status).await;
        }
        if !response.is_success() {
            warn!(status, token = %current.fingerprint(), "token refresh failed");
            return RefreshOutcome::Failed {
                status: Some(status),
                reason: format!("refresh endpoint answered {status}"),
            };
        }

        let body: Value = match serde_json::from_slice(response.body()) {
            Ok(body) => body,
            Err(err) => {
                return self
                    .end_with_error(&format!("invalid JSON response: {err}"))
                    .await;
            }
        };
        let Some(token) = extract_token(&body) else {
            warn!(status, "token refresh response carried no token");
            return RefreshOutcome::Failed {
                status: Some(status),
                reason: "refresh response carried no token".to_owned(),
            };
        };

        if let Err(err) = self.persist(&token, body.get("user")).await {
            return self.end_with_error(&err).await;
        }
        info!(
            previous = %current.fingerprint(),
            token = %token.fingerprint(),
            "session token refreshed"
        );
        RefreshOutcome::Refreshed(token)
    }

    async fn persist(&self, token: &SessionToken, user: Option<&Value>) -> Result<(), String> {
        self.store
            .set_token(token)
            .await
            .map_err(|err| err.to_string())?;
        let Some(user) = user.filter(|value| value.is_object()) else {
            return Ok(());
        };
        let profile = UserProfile::from_json(user).map_err(|err| err.to_string())?;
        self.store
            .set_user(&profile)
            .await
            .map_err(|err| err.to_string())
    }

    async fn end_rejected(&self, current: &SessionToken, status: u16) -> RefreshOutcome {
        warn!(status, token = %current.fingerprint(), "refresh rejected; ending session");
        self.clear().await;
        RefreshOutcome::SessionEnded(self.login.expired())
    }

    async fn end_with_error(&self, reason: &str) -> RefreshOutcome {
        warn!(reason, "token refresh raised an error; ending session");
        self.clear().await;
        RefreshOutcome::SessionEnded(self.login.expired_with_error())
    }

    async fn clear(&self) {
        if let Err(err) = self.store.clear_session().await {
            warn!(error = %err, "failed to clear session after refresh failure");
        }
    }
}

#[cfg(test)]
mod tests;
