//! Session state carried by the `token` and `user` cookies.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Cookie holding the bearer token.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie holding the serialized user profile.
pub const USER_COOKIE: &str = "user";

/// Length of a token fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Validation failures for [`SessionToken`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenError {
    /// Token was empty once trimmed.
    #[error("session token must not be empty")]
    Empty,
    /// Token contained whitespace or control characters.
    #[error("session token must not contain whitespace or control characters")]
    InvalidCharacters,
}

/// Opaque bearer token.
///
/// ## Invariants
/// - Non-empty after trimming surrounding whitespace.
/// - Contains no interior whitespace or control characters, so it is always
///   safe to place in an `Authorization` header or a cookie.
/// - The backing buffer is zeroized on drop and never printed; `Debug`
///   shows a fingerprint instead.
///
/// # Examples
/// ```
/// use dashboard::domain::SessionToken;
///
/// let token = SessionToken::new(" abc.def.ghi ").unwrap();
/// assert_eq!(token.as_str(), "abc.def.ghi");
/// assert!(!format!("{token:?}").contains("abc"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Validate and wrap a raw token.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SessionTokenError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionTokenError::Empty);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(SessionTokenError::InvalidCharacters);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Truncated SHA-256 fingerprint, safe for logs.
    ///
    /// Returns the first 8 bytes of the hash as 16 lowercase hex characters.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }

    /// `Bearer <token>` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.as_str())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken")
            .field(&self.fingerprint())
            .finish()
    }
}

/// Profile blob stored alongside the token for client-side role branching.
///
/// Unknown fields round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Upstream identifier; numeric or string depending on the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role used by the dashboard to pick navigation and permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Fields the dashboard does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Parse a profile from a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Parse a profile from serialized cookie text.
    pub fn from_cookie_value(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Serialize for storage in the `user` cookie.
    #[must_use]
    pub fn to_cookie_value(&self) -> String {
        self.to_json().to_string()
    }

    /// Case-insensitive role comparison.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .is_some_and(|own| own.trim().eq_ignore_ascii_case(role.trim()))
    }
}
