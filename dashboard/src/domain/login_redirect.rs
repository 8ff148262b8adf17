//! Login navigation instructions returned by the data layer.
//!
//! The client never navigates from inside a fetch helper. Forced-logout paths
//! return a [`LoginRedirect`] attached to the error instead, and the UI or the
//! gateway decides whether to follow it.

use serde::Serialize;

/// Default login route used when none is configured.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Why the caller is being sent back to the login screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// The session ended because the token was rejected or missing.
    Expired,
    /// The session ended because refreshing it raised an unexpected error.
    ExpiredWithError,
}

/// Navigation target for a forced logout.
///
/// # Examples
/// ```
/// use dashboard::domain::LoginRoute;
///
/// let route = LoginRoute::default();
/// assert_eq!(route.expired().location(), "/login?expired=true");
/// assert_eq!(
///     route.expired_with_error().location(),
///     "/login?expired=true&error=true"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRedirect {
    location: String,
    reason: RedirectReason,
}

impl LoginRedirect {
    /// Full location including the query flags.
    #[must_use]
    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    /// Reason the redirect was produced.
    #[must_use]
    pub fn reason(&self) -> RedirectReason {
        self.reason
    }
}

/// Configured login route that mints [`LoginRedirect`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRoute {
    path: String,
}

impl Default for LoginRoute {
    fn default() -> Self {
        Self {
            path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }
}

impl LoginRoute {
    /// Use `path` as the login route. Blank input falls back to
    /// [`DEFAULT_LOGIN_PATH`].
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            path: trimmed.to_owned(),
        }
    }

    /// Configured route without query flags.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Redirect flagged `expired`.
    #[must_use]
    pub fn expired(&self) -> LoginRedirect {
        self.redirect(RedirectReason::Expired)
    }

    /// Redirect flagged `expired` and `error`.
    #[must_use]
    pub fn expired_with_error(&self) -> LoginRedirect {
        self.redirect(RedirectReason::ExpiredWithError)
    }

    fn redirect(&self, reason: RedirectReason) -> LoginRedirect {
        let flags = match reason {
            RedirectReason::Expired => "expired=true",
            RedirectReason::ExpiredWithError => "expired=true&error=true",
        };
        let separator = if self.path.contains('?') { '&' } else { '?' };
        LoginRedirect {
            location: format!("{}{separator}{flags}", self.path),
            reason,
        }
    }
}
