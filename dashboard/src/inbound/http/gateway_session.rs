//! Request-scoped session wiring for gateway handlers.
//!
//! [`GatewaySession`] is an extractor that reads the session cookies and
//! builds the server-context services over them. Handlers finish through
//! [`GatewaySession::respond`] so cookie changes reach the browser on both
//! success and error responses.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::{Ready, ready};

use crate::domain::{
    AuthService, AuthenticatedFetch, Error, ResourceActions, ResourceName, ServerAuthProvider,
};

use super::ApiResult;
use super::request_cookies::RequestCookieStore;
use super::state::HttpState;

/// Services bound to the cookies of the current request.
pub struct GatewaySession {
    state: HttpState,
    store: Arc<RequestCookieStore>,
}

impl GatewaySession {
    /// Read the session cookies of `req`.
    pub fn new(state: &HttpState, req: &HttpRequest) -> Self {
        Self {
            state: state.clone(),
            store: Arc::new(RequestCookieStore::from_request(req, state.cookies)),
        }
    }

    /// Underlying cookie store.
    pub fn store(&self) -> &RequestCookieStore {
        &self.store
    }

    /// Fetch wrapper authenticated from the request cookies. Never refreshes.
    pub fn fetch(&self) -> AuthenticatedFetch {
        AuthenticatedFetch::new(
            self.state.transport.clone(),
            Arc::new(ServerAuthProvider::new(self.store.clone())),
            self.store.clone(),
            self.state.login.clone(),
        )
    }

    /// Login and logout over the request cookies.
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.state.transport.clone(), self.store.clone())
    }

    /// CRUD actions for `resource`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidRequest` error for malformed resource names.
    pub fn resource(&self, resource: &str) -> ApiResult<ResourceActions> {
        let name = ResourceName::new(resource)?;
        Ok(ResourceActions::new(self.fetch(), name))
    }

    /// Turn a handler result into a response carrying any cookie changes.
    pub fn respond(&self, result: ApiResult<HttpResponse>) -> HttpResponse {
        let mut response = result.unwrap_or_else(|err| err.error_response());
        self.store.apply(&mut response);
        response
    }
}

impl FromRequest for GatewaySession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req
            .app_data::<web::Data<HttpState>>()
            .map(|state| Self::new(state.get_ref(), req))
            .ok_or_else(|| {
                tracing::error!("gateway state missing from application data");
                Error::internal("gateway state not configured").into()
            });
        ready(session)
    }
}
