//! Client-context composition root.
//!
//! A long-lived caller with its own session store: every request goes
//! through [`ClientAuthProvider`], which refreshes the token when it is about
//! to expire.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::config::ResolvedSettings;
use crate::domain::ports::{HttpTransport, SessionStore};
use crate::domain::{
    ApiResult, AuthService, AuthenticatedFetch, ClientAuthProvider, LoginRoute, ResourceActions,
    ResourceName, TokenExpiryChecker, TokenRefreshService,
};
use crate::outbound::http::ReqwestTransport;

/// Authenticated data access for the client context.
#[derive(Clone)]
pub struct DashboardClient {
    fetch: AuthenticatedFetch,
    auth: AuthService,
}

impl DashboardClient {
    /// Wire the client from explicit parts.
    pub fn from_parts(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        login: LoginRoute,
        expiry_threshold_secs: i64,
    ) -> Self {
        let checker = TokenExpiryChecker::new(clock).with_threshold(expiry_threshold_secs);
        let refresher = TokenRefreshService::new(transport.clone(), store.clone(), login.clone());
        let provider = ClientAuthProvider::new(store.clone(), checker, refresher, login.clone());
        Self {
            fetch: AuthenticatedFetch::new(
                transport.clone(),
                Arc::new(provider),
                store.clone(),
                login,
            ),
            auth: AuthService::new(transport, store),
        }
    }

    /// Wire the client over reqwest and the system clock.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error when the HTTP client cannot be built.
    pub fn from_settings(
        settings: &ResolvedSettings,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, reqwest::Error> {
        let transport =
            ReqwestTransport::new(settings.api_base_url.clone(), settings.request_timeout)?;
        Ok(Self::from_parts(
            Arc::new(transport),
            store,
            Arc::new(DefaultClock),
            settings.login.clone(),
            settings.expiry_threshold_secs,
        ))
    }

    /// Authenticated fetch wrapper.
    pub fn fetch(&self) -> &AuthenticatedFetch {
        &self.fetch
    }

    /// Login and logout.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// CRUD actions for `resource`.
    ///
    /// # Errors
    ///
    /// An `InvalidRequest` error for malformed resource names.
    pub fn resource(&self, resource: &str) -> ApiResult<ResourceActions> {
        Ok(ResourceActions::new(
            self.fetch.clone(),
            ResourceName::new(resource)?,
        ))
    }
}
