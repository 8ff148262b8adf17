//! Process-local session store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionToken, UserProfile};

#[derive(Debug, Default, Clone)]
struct Entries {
    token: Option<SessionToken>,
    user: Option<UserProfile>,
}

/// Session store held in memory behind a lock.
///
/// # Examples
/// ```
/// use dashboard::domain::SessionToken;
/// use dashboard::domain::ports::SessionStore;
/// use dashboard::outbound::session::InMemorySessionStore;
///
/// # tokio_test_block(async {
/// let store = InMemorySessionStore::with_token(SessionToken::new("a.b.c").unwrap());
/// assert!(store.token().await.unwrap().is_some());
/// store.clear_session().await.unwrap();
/// assert!(store.token().await.unwrap().is_none());
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: RwLock<Entries>,
}

impl InMemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `token`.
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            entries: RwLock::new(Entries {
                token: Some(token),
                user: None,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Entries>, SessionStoreError> {
        self.entries
            .read()
            .map_err(|_| SessionStoreError::read("session lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>, SessionStoreError> {
        self.entries
            .write()
            .map_err(|_| SessionStoreError::write("session lock poisoned"))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn token(&self) -> Result<Option<SessionToken>, SessionStoreError> {
        Ok(self.read()?.token.clone())
    }

    async fn set_token(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        self.write()?.token = Some(token.clone());
        Ok(())
    }

    async fn user(&self) -> Result<Option<UserProfile>, SessionStoreError> {
        Ok(self.read()?.user.clone())
    }

    async fn set_user(&self, user: &UserProfile) -> Result<(), SessionStoreError> {
        self.write()?.user = Some(user.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), SessionStoreError> {
        *self.write()? = Entries::default();
        Ok(())
    }
}
