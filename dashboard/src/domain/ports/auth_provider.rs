//! Port that yields the headers for an authenticated request.
//!
//! Client and server execution contexts provide separate implementations;
//! callers pick one at construction instead of branching at runtime.

use async_trait::async_trait;

use crate::domain::{ApiRequest, Error, SessionToken};

/// Headers attached to every authenticated API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    token: SessionToken,
}

impl AuthHeaders {
    /// Value of the `content-type` header sent with authenticated calls.
    pub const CONTENT_TYPE: &'static str = "application/json";

    /// Wrap the token that authorizes the call.
    pub fn new(token: SessionToken) -> Self {
        Self { token }
    }

    /// Token carried in the `authorization` header.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// `Bearer <token>` header value.
    pub fn authorization(&self) -> String {
        self.token.bearer()
    }

    /// Set `authorization` and `content-type` on `request`.
    pub fn apply(&self, request: &mut ApiRequest) {
        request.set_header("authorization", self.authorization());
        request.set_header("content-type", Self::CONTENT_TYPE);
    }
}

/// Supplies auth headers for the current execution context.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Produce headers for the next call, refreshing first if the context
    /// allows it.
    async fn auth_headers(&self) -> Result<AuthHeaders, Error>;
}
