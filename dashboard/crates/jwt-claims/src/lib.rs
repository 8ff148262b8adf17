//! Unverified decoding of JWT-shaped bearer tokens.
//!
//! The dashboard only needs to read the `exp` claim of its own session token
//! to decide whether a refresh is due. No signature is checked here: the
//! upstream API remains the authority on token validity, and every decoded
//! value must be treated as untrusted.
//!
//! ```
//! use base64::Engine as _;
//! use base64::engine::general_purpose::URL_SAFE_NO_PAD;
//!
//! let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":1700000000,"sub":"42"}"#);
//! let token = format!("header.{payload}.signature");
//!
//! let claims = jwt_claims::decode_unverified(&token).expect("well-formed token");
//! assert_eq!(claims.expires_at(), Some(1_700_000_000));
//! assert_eq!(claims.subject(), Some("42"));
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of `.`-separated segments in a compact JWT.
pub const SEGMENT_COUNT: usize = 3;

/// Reasons a token cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    /// The token was empty or whitespace.
    #[error("token is empty")]
    Empty,
    /// The token did not split into exactly three segments.
    #[error("token must have {SEGMENT_COUNT} segments, found {found}")]
    SegmentCount {
        /// Number of segments actually present.
        found: usize,
    },
    /// The payload segment was not valid base64.
    #[error("token payload is not valid base64: {message}")]
    Base64 {
        /// Decoder error description.
        message: String,
    },
    /// The payload bytes were not valid JSON.
    #[error("token payload is not valid JSON: {message}")]
    Json {
        /// Parser error description.
        message: String,
    },
    /// The payload parsed, but not as a JSON object.
    #[error("token payload must be a JSON object")]
    NotAnObject,
}

/// Claims read from a token payload without verifying its signature.
#[derive(Debug, Clone, PartialEq)]
pub struct UnverifiedClaims {
    claims: Map<String, Value>,
}

impl UnverifiedClaims {
    /// Expiry as seconds since the Unix epoch.
    ///
    /// Fractional values are truncated toward zero. Returns `None` when the
    /// claim is missing or not numeric.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        let exp = self.claims.get("exp")?;
        if let Some(seconds) = exp.as_i64() {
            return Some(seconds);
        }
        exp.as_f64()
            .filter(|seconds| seconds.is_finite())
            .map(truncate_seconds)
    }

    /// Subject claim, when present as a string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// Look up an arbitrary claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "expiry claims are whole seconds; truncation is the documented behaviour"
)]
fn truncate_seconds(seconds: f64) -> i64 {
    seconds.trunc() as i64
}

/// Decode the payload segment of `token` without signature verification.
///
/// Both the URL-safe and the standard base64 alphabets are accepted, with or
/// without padding, since tokens issued by different stacks disagree.
///
/// # Errors
///
/// Returns a [`ClaimsError`] describing the first structural problem found.
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, ClaimsError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ClaimsError::Empty);
    }

    let segments: Vec<&str> = trimmed.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(ClaimsError::SegmentCount {
            found: segments.len(),
        });
    };

    let bytes = decode_segment(payload)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|err| ClaimsError::Json {
        message: err.to_string(),
    })?;

    match value {
        Value::Object(claims) => Ok(UnverifiedClaims { claims }),
        _ => Err(ClaimsError::NotAnObject),
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, ClaimsError> {
    let normalised: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalised.as_bytes())
        .map_err(|err| ClaimsError::Base64 {
            message: err.to_string(),
        })
}
