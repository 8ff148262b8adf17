//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and build their
//! request-scoped services from it, so they depend only on domain ports and
//! stay testable without network I/O.

use std::sync::Arc;

use crate::domain::LoginRoute;
use crate::domain::ports::HttpTransport;

use super::request_cookies::CookiePolicy;

/// Dependency bundle for gateway handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Transport to the upstream business API.
    pub transport: Arc<dyn HttpTransport>,
    /// Attributes for the `token` and `user` cookies.
    pub cookies: CookiePolicy,
    /// Login route minted into redirects.
    pub login: LoginRoute,
}

impl HttpState {
    /// Bundle the gateway dependencies.
    pub fn new(transport: Arc<dyn HttpTransport>, cookies: CookiePolicy, login: LoginRoute) -> Self {
        Self {
            transport,
            cookies,
            login,
        }
    }
}
