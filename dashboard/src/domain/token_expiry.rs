//! Pre-emptive expiry check for JWT-shaped session tokens.
//!
//! The token payload is decoded without verifying the signature; the result
//! only decides whether to refresh before a request, never whether to trust
//! the token. Anything that cannot be read counts as expiring.

use std::sync::Arc;

use jwt_claims::{ClaimsError, decode_unverified};
use mockable::Clock;
use tracing::debug;

/// Seconds before expiry at which a token is considered due for refresh.
pub const DEFAULT_EXPIRY_THRESHOLD_SECONDS: i64 = 300;

/// Classification of a token relative to the refresh threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// More than the threshold remains.
    Fresh {
        /// Seconds until `exp`.
        remaining: i64,
    },
    /// Still valid, but within the threshold.
    Expiring {
        /// Seconds until `exp`.
        remaining: i64,
    },
    /// `exp` is now or in the past.
    Expired,
    /// The payload could not be decoded or had no numeric `exp`.
    Unreadable(String),
}

impl TokenStatus {
    /// True unless the token is [`TokenStatus::Fresh`].
    #[must_use]
    pub fn is_expiring(&self) -> bool {
        !matches!(self, Self::Fresh { .. })
    }

    /// True while the token can still authorize a request.
    #[must_use]
    pub fn has_time_left(&self) -> bool {
        matches!(self, Self::Fresh { .. } | Self::Expiring { .. })
    }
}

/// Compares a token's `exp` claim with the injected clock.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use dashboard::domain::TokenExpiryChecker;
/// use mockable::DefaultClock;
///
/// let checker = TokenExpiryChecker::new(Arc::new(DefaultClock));
/// assert!(checker.is_token_expiring("not-a-jwt"));
/// ```
#[derive(Clone)]
pub struct TokenExpiryChecker {
    clock: Arc<dyn Clock>,
    threshold_seconds: i64,
}

impl TokenExpiryChecker {
    /// Checker using [`DEFAULT_EXPIRY_THRESHOLD_SECONDS`].
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            threshold_seconds: DEFAULT_EXPIRY_THRESHOLD_SECONDS,
        }
    }

    /// Override the refresh threshold. Negative values are treated as zero.
    #[must_use]
    pub fn with_threshold(mut self, threshold_seconds: i64) -> Self {
        self.threshold_seconds = threshold_seconds.max(0);
        self
    }

    /// Configured threshold in seconds.
    #[must_use]
    pub fn threshold_seconds(&self) -> i64 {
        self.threshold_seconds
    }

    /// Classify `token`.
    pub fn status(&self, token: &str) -> TokenStatus {
        let expires_at = match decode_unverified(token) {
            Ok(claims) => claims.expires_at(),
            Err(err) => return unreadable(&err),
        };
        let Some(expires_at) = expires_at else {
            debug!("session token carries no numeric exp claim");
            return TokenStatus::Unreadable("missing exp claim".to_owned());
        };

        let remaining = expires_at.saturating_sub(self.clock.utc().timestamp());
        if remaining <= 0 {
            TokenStatus::Expired
        } else if remaining < self.threshold_seconds {
            TokenStatus::Expiring { remaining }
        } else {
            TokenStatus::Fresh { remaining }
        }
    }

    /// True when `token` is unreadable, expired, or within the threshold.
    pub fn is_token_expiring(&self, token: &str) -> bool {
        self.status(token).is_expiring()
    }
}

fn unreadable(err: &ClaimsError) -> TokenStatus {
    debug!(error = %err, "session token payload is unreadable");
    TokenStatus::Unreadable(err.to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::test_support::{FixtureClock, jwt_with_exp, jwt_with_payload};
    use rstest::rstest;
    use serde_json::json;

    const NOW: i64 = 1_760_000_000;

    fn checker() -> TokenExpiryChecker {
        TokenExpiryChecker::new(Arc::new(FixtureClock::at_timestamp(NOW)))
    }

    #[rstest]
    #[case(301, false)]
    #[case(3_600, false)]
    #[case(300, false)]
    #[case(299, true)]
    #[case(100, true)]
    #[case(0, true)]
    #[case(-60, true)]
    fn compares_exp_with_threshold(#[case] offset: i64, #[case] expiring: bool) {
        let token = jwt_with_exp(NOW + offset);
        assert_eq!(checker().is_token_expiring(&token), expiring);
    }

    #[rstest]
    #[case("")]
    #[case("only.two")]
    #[case("a.b.c.d")]
    #[case("header.%%%.sig")]
    fn malformed_tokens_are_expiring(#[case] token: &str) {
        let checker = checker();
        assert!(matches!(checker.status(token), TokenStatus::Unreadable(_)));
        assert!(checker.is_token_expiring(token));
    }

    #[rstest]
    #[case(json!({ "sub": "42" }))]
    #[case(json!({ "exp": "soon" }))]
    #[case(json!([1, 2, 3]))]
    fn payload_without_numeric_exp_is_expiring(#[case] payload: serde_json::Value) {
        let token = jwt_with_payload(&payload);
        assert!(matches!(checker().status(&token), TokenStatus::Unreadable(_)));
    }

    #[rstest]
    fn reports_remaining_seconds() {
        let checker = checker();
        assert_eq!(
            checker.status(&jwt_with_exp(NOW + 100)),
            TokenStatus::Expiring { remaining: 100 }
        );
        assert_eq!(
            checker.status(&jwt_with_exp(NOW + 900)),
            TokenStatus::Fresh { remaining: 900 }
        );
        assert_eq!(checker.status(&jwt_with_exp(NOW)), TokenStatus::Expired);
    }

    #[rstest]
    fn custom_threshold_moves_the_boundary() {
        let checker = checker().with_threshold(60);
        assert!(!checker.is_token_expiring(&jwt_with_exp(NOW + 100)));
        assert!(checker.is_token_expiring(&jwt_with_exp(NOW + 59)));
    }
}
