//! Session store backed by the cookies of one gateway request.
//!
//! Reads the `token` and `user` cookies once when the request arrives. Writes
//! are buffered and turned into `Set-Cookie` headers when the response is
//! built, so a refresh or an upstream 401 inside a handler reaches the
//! browser.

use std::sync::{Mutex, MutexGuard};

use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::cookie::{Cookie, SameSite};
use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionToken, TOKEN_COOKIE, USER_COOKIE, UserProfile};

/// Attributes applied to session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl CookiePolicy {
    /// Policy with the `Secure` attribute toggled by `secure`.
    #[must_use]
    pub const fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Whether cookies carry the `Secure` attribute.
    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// `Path=/; HttpOnly; SameSite=Lax` cookie holding `value`.
    #[must_use]
    pub fn session_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .finish()
    }

    /// Expired cookie that deletes `name` in the browser.
    #[must_use]
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.session_cookie(name, String::new());
        cookie.make_removal();
        cookie
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Change {
    #[default]
    Unchanged,
    Set(String),
    Removed,
}

#[derive(Debug, Default)]
struct CookieState {
    token: Option<SessionToken>,
    user: Option<UserProfile>,
    token_change: Change,
    user_change: Change,
}

/// Request-scoped [`SessionStore`] over the `token` and `user` cookies.
#[derive(Debug)]
pub struct RequestCookieStore {
    policy: CookiePolicy,
    state: Mutex<CookieState>,
}

impl RequestCookieStore {
    /// Read the session cookies from `req`.
    ///
    /// Unusable values are ignored as if the cookie were absent.
    pub fn from_request(req: &HttpRequest, policy: CookiePolicy) -> Self {
        let token = req
            .cookie(TOKEN_COOKIE)
            .and_then(|cookie| match SessionToken::new(cookie.value()) {
                Ok(token) => Some(token),
                Err(err) => {
                    debug!(error = %err, "ignoring unusable token cookie");
                    None
                }
            });
        let user = req.cookie(USER_COOKIE).and_then(|cookie| {
            match UserProfile::from_cookie_value(cookie.value()) {
                Ok(user) => Some(user),
                Err(err) => {
                    debug!(error = %err, "ignoring unreadable user cookie");
                    None
                }
            }
        });
        Self::with_state(policy, token, user)
    }

    fn with_state(
        policy: CookiePolicy,
        token: Option<SessionToken>,
        user: Option<UserProfile>,
    ) -> Self {
        Self {
            policy,
            state: Mutex::new(CookieState {
                token,
                user,
                ..CookieState::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CookieState>, SessionStoreError> {
        self.state
            .lock()
            .map_err(|_| SessionStoreError::read("cookie state lock poisoned"))
    }

    /// Cookies to send back for the writes made during this request.
    pub fn pending_cookies(&self) -> Vec<Cookie<'static>> {
        let Ok(state) = self.lock() else {
            return Vec::new();
        };
        [
            (TOKEN_COOKIE, &state.token_change),
            (USER_COOKIE, &state.user_change),
        ]
        .into_iter()
        .filter_map(|(name, change)| match change {
            Change::Unchanged => None,
            Change::Set(value) => Some(self.policy.session_cookie(name, value.clone())),
            Change::Removed => Some(self.policy.removal_cookie(name)),
        })
        .collect()
    }

    /// Attach the pending cookies to `response`.
    pub fn apply(&self, response: &mut HttpResponse) {
        for cookie in self.pending_cookies() {
            if let Err(err) = response.add_cookie(&cookie) {
                error!(error = %err, cookie = cookie.name(), "failed to attach session cookie");
            }
        }
    }
}

#[async_trait]
impl SessionStore for RequestCookieStore {
    async fn token(&self) -> Result<Option<SessionToken>, SessionStoreError> {
        Ok(self.lock()?.token.clone())
    }

    async fn set_token(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        let mut state = self.lock()?;
        state.token = Some(token.clone());
        state.token_change = Change::Set(token.as_str().to_owned());
        Ok(())
    }

    async fn user(&self) -> Result<Option<UserProfile>, SessionStoreError> {
        Ok(self.lock()?.user.clone())
    }

    async fn set_user(&self, user: &UserProfile) -> Result<(), SessionStoreError> {
        let mut state = self.lock()?;
        state.user = Some(user.clone());
        state.user_change = Change::Set(user.to_cookie_value());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), SessionStoreError> {
        let mut state = self.lock()?;
        state.token = None;
        state.user = None;
        state.token_change = Change::Removed;
        state.user_change = Change::Removed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::time::Duration;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn cookie<'a>(cookies: &'a [Cookie<'static>], name: &str) -> &'a Cookie<'static> {
        cookies
            .iter()
            .find(|cookie| cookie.name() == name)
            .expect("cookie present")
    }

    #[tokio::test]
    async fn reads_session_cookies_from_request() {
        let req = TestRequest::default()
            .cookie(Cookie::new(TOKEN_COOKIE, "a.b.c"))
            .cookie(Cookie::new(USER_COOKIE, r#"{"email":"ops@example.com","role":"admin"}"#))
            .to_http_request();
        let store = RequestCookieStore::from_request(&req, CookiePolicy::default());

        assert_eq!(
            store.token().await.expect("read"),
            Some(SessionToken::new("a.b.c").expect("token"))
        );
        let user = store.user().await.expect("read").expect("user");
        assert!(user.has_role("admin"));
        assert!(store.pending_cookies().is_empty());
    }

    #[tokio::test]
    async fn ignores_unreadable_cookies() {
        let req = TestRequest::default()
            .cookie(Cookie::new(TOKEN_COOKIE, "   "))
            .cookie(Cookie::new(USER_COOKIE, "not json"))
            .to_http_request();
        let store = RequestCookieStore::from_request(&req, CookiePolicy::default());
        assert_eq!(store.token().await.expect("read"), None);
        assert_eq!(store.user().await.expect("read"), None);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn writes_become_session_cookies(#[case] secure: bool) {
        let store = RequestCookieStore::with_state(CookiePolicy::new(secure), None, None);
        store
            .set_token(&SessionToken::new("fresh").expect("token"))
            .await
            .expect("write");

        let cookies = store.pending_cookies();
        assert_eq!(cookies.len(), 1);
        let token = cookie(&cookies, TOKEN_COOKIE);
        assert_eq!(token.value(), "fresh");
        assert_eq!(token.path(), Some("/"));
        assert_eq!(token.http_only(), Some(true));
        assert_eq!(token.same_site(), Some(SameSite::Lax));
        assert_eq!(token.secure(), Some(secure));
    }

    #[tokio::test]
    async fn clearing_emits_removal_cookies() {
        let store = RequestCookieStore::with_state(
            CookiePolicy::default(),
            SessionToken::new("stale").ok(),
            Some(UserProfile::default()),
        );
        store.clear_session().await.expect("clear");

        let cookies = store.pending_cookies();
        for name in [TOKEN_COOKIE, USER_COOKIE] {
            let removal = cookie(&cookies, name);
            assert_eq!(removal.value(), "");
            assert_eq!(removal.max_age(), Some(Duration::ZERO));
        }
        assert_eq!(store.token().await.expect("read"), None);
    }

    #[tokio::test]
    async fn apply_sets_headers_on_response() {
        let store = RequestCookieStore::with_state(CookiePolicy::new(false), None, None);
        store
            .set_user(&UserProfile {
                name: Some("Ada".to_owned()),
                ..UserProfile::default()
            })
            .await
            .expect("write");
        let mut response = HttpResponse::Ok().finish();
        store.apply(&mut response);
        let user = response
            .cookies()
            .find(|cookie| cookie.name() == USER_COOKIE)
            .expect("user cookie");
        assert_eq!(user.value(), r#"{"name":"Ada"}"#);
    }
}
