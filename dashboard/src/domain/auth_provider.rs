//! Auth header builders for the two execution contexts.
//!
//! [`ClientAuthProvider`] owns a persisted session and may refresh the token
//! before handing it out. [`ServerAuthProvider`] reads the request-scoped
//! cookies and never refreshes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ports::{AuthHeaders, AuthProvider, SessionStore};
use super::token_expiry::{TokenExpiryChecker, TokenStatus};
use super::token_refresh::{RefreshOutcome, TokenRefreshService};
use super::{Error, LoginRoute, SessionToken};

const MISSING_TOKEN_MESSAGE: &str = "You are not signed in. Please log in to continue.";
const SESSION_ENDED_MESSAGE: &str = "Your session has expired. Please log in again.";
const REFRESH_FAILED_MESSAGE: &str = "Your session could not be renewed. Please log in again.";

fn read_failure(err: impl std::fmt::Display) -> Error {
    warn!(error = %err, "session store read failed");
    Error::internal("Session state could not be read.")
}

/// Auth headers for a long-lived client with a persisted cookie store.
#[derive(Clone)]
pub struct ClientAuthProvider {
    store: Arc<dyn SessionStore>,
    checker: TokenExpiryChecker,
    refresher: TokenRefreshService,
    login: LoginRoute,
}

impl ClientAuthProvider {
    /// Build a provider. `refresher` must share `store`.
    pub fn new(
        store: Arc<dyn SessionStore>,
        checker: TokenExpiryChecker,
        refresher: TokenRefreshService,
        login: LoginRoute,
    ) -> Self {
        Self {
            store,
            checker,
            refresher,
            login,
        }
    }

    async fn refreshed_token(
        &self,
        current: SessionToken,
        status: &TokenStatus,
    ) -> Result<SessionToken, Error> {
        match self.refresher.refresh().await {
            RefreshOutcome::Refreshed(token) => Ok(token),
            RefreshOutcome::SessionEnded(redirect) => {
                Err(Error::session_expired(SESSION_ENDED_MESSAGE).with_redirect(redirect))
            }
            RefreshOutcome::Failed { status: http, reason } if status.has_time_left() => {
                warn!(
                    status = http,
                    reason,
                    token = %current.fingerprint(),
                    "refresh failed; continuing with current token"
                );
                Ok(current)
            }
            RefreshOutcome::Failed { status: http, reason } => {
                warn!(status = http, reason, "refresh failed and the token is unusable");
                let err = Error::refresh_failed(REFRESH_FAILED_MESSAGE)
                    .with_redirect(self.login.expired());
                Err(match http {
                    Some(code) => err.with_status(code),
                    None => err,
                })
            }
        }
    }
}

#[async_trait]
impl AuthProvider for ClientAuthProvider {
    async fn auth_headers(&self) -> Result<AuthHeaders, Error> {
        let Some(current) = self.store.token().await.map_err(read_failure)? else {
            return Err(
                Error::unauthenticated(MISSING_TOKEN_MESSAGE).with_redirect(self.login.expired())
            );
        };

        let status = self.checker.status(current.as_str());
        if !status.is_expiring() {
            return Ok(AuthHeaders::new(current));
        }
        debug!(?status, token = %current.fingerprint(), "token due for refresh");
        let token = self.refreshed_token(current, &status).await?;
        Ok(AuthHeaders::new(token))
    }
}

/// Auth headers for server-side handlers working from request cookies.
#[derive(Clone)]
pub struct ServerAuthProvider {
    store: Arc<dyn SessionStore>,
}

impl ServerAuthProvider {
    /// Build a provider over the request-scoped session store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthProvider for ServerAuthProvider {
    async fn auth_headers(&self) -> Result<AuthHeaders, Error> {
        self.store
            .token()
            .await
            .map_err(read_failure)?
            .map(AuthHeaders::new)
            .ok_or_else(|| Error::unauthenticated(MISSING_TOKEN_MESSAGE))
    }
}
