//! Driven port for the persisted session state.
//!
//! The store is the only shared mutable state in the data layer. Readers and
//! writers never coordinate beyond the store's own consistency, so concurrent
//! writes resolve as last write wins.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{SessionToken, UserProfile};

define_port_error! {
    /// Errors surfaced by session store adapters.
    pub enum SessionStoreError {
        /// Stored state could not be read or decoded.
        Read { message: String } =>
            "session store read failed: {message}",
        /// State could not be persisted.
        Write { message: String } =>
            "session store write failed: {message}",
    }
}

/// Access to the `token` and `user` session entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current bearer token, if any.
    async fn token(&self) -> Result<Option<SessionToken>, SessionStoreError>;

    /// Replace the bearer token.
    async fn set_token(&self, token: &SessionToken) -> Result<(), SessionStoreError>;

    /// Stored user profile, if any.
    async fn user(&self) -> Result<Option<UserProfile>, SessionStoreError>;

    /// Replace the stored user profile.
    async fn set_user(&self, user: &UserProfile) -> Result<(), SessionStoreError>;

    /// Remove both the token and the user profile.
    async fn clear_session(&self) -> Result<(), SessionStoreError>;
}
