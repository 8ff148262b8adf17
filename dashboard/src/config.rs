//! Gateway and client configuration loaded via OrthoConfig.
//!
//! Values layer CLI arguments over `DASHBOARD_*` environment variables over
//! configuration files. Every setting is optional; the typed accessors apply
//! defaults and validate.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{DEFAULT_EXPIRY_THRESHOLD_SECONDS, DEFAULT_LOGIN_PATH, LoginRoute};
use crate::inbound::http::CookiePolicy;

/// Upstream API used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
/// Listener address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Upstream request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while validating configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL did not parse or cannot carry paths.
    #[error("invalid api_base_url '{value}': {reason}")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The bind address is not `host:port`.
    #[error("invalid bind_addr '{value}': {source}")]
    InvalidBindAddr {
        /// Configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// A zero request timeout would fail every call.
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
    /// Login paths are absolute and carry no query string.
    #[error("invalid login_path '{value}': expected an absolute path without a query")]
    InvalidLoginPath {
        /// Configured value.
        value: String,
    },
    /// Negative thresholds make no sense.
    #[error("expiry_threshold_secs must not be negative, got {value}")]
    NegativeThreshold {
        /// Configured value.
        value: i64,
    },
}

/// Raw configuration values.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DASHBOARD")]
pub struct DashboardSettings {
    /// Base URL of the upstream business API.
    pub api_base_url: Option<String>,
    /// Address the gateway listens on.
    pub bind_addr: Option<String>,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Route the dashboard serves its login screen from.
    pub login_path: Option<String>,
    /// Drop the `Secure` attribute from session cookies (local HTTP only).
    #[ortho_config(default = false)]
    pub cookie_insecure: bool,
    /// Refresh tokens expiring within this many seconds.
    pub expiry_threshold_secs: Option<i64>,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Upstream API base.
    pub api_base_url: Url,
    /// Listener address.
    pub bind_addr: SocketAddr,
    /// Upstream request timeout.
    pub request_timeout: Duration,
    /// Login route for redirects.
    pub login: LoginRoute,
    /// Session cookie attributes.
    pub cookies: CookiePolicy,
    /// Pre-emptive refresh window in seconds.
    pub expiry_threshold_secs: i64,
}

impl DashboardSettings {
    /// Upstream API base URL.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBaseUrl`] when the value does not parse or is
    /// not an `http(s)` URL.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(url)
    }

    /// Gateway listener address.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidBindAddr`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| ConfigError::InvalidBindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Upstream request timeout.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroTimeout`] for a zero value.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS) {
            0 => Err(ConfigError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Login route for forced-logout redirects.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidLoginPath`] unless the path starts with `/` and
    /// has no query or fragment.
    pub fn login_route(&self) -> Result<LoginRoute, ConfigError> {
        let raw = self.login_path.as_deref().unwrap_or(DEFAULT_LOGIN_PATH).trim();
        if !raw.starts_with('/') || raw.contains(['?', '#']) {
            return Err(ConfigError::InvalidLoginPath {
                value: raw.to_owned(),
            });
        }
        Ok(LoginRoute::new(raw))
    }

    /// Cookie attributes; `Secure` unless `cookie_insecure` is set.
    #[must_use]
    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::new(!self.cookie_insecure)
    }

    /// Pre-emptive refresh window.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NegativeThreshold`] for values below zero.
    pub fn expiry_threshold_secs(&self) -> Result<i64, ConfigError> {
        match self
            .expiry_threshold_secs
            .unwrap_or(DEFAULT_EXPIRY_THRESHOLD_SECONDS)
        {
            value if value < 0 => Err(ConfigError::NegativeThreshold { value }),
            value => Ok(value),
        }
    }

    /// Validate every setting at once.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found.
    pub fn resolve(&self) -> Result<ResolvedSettings, ConfigError> {
        Ok(ResolvedSettings {
            api_base_url: self.api_base_url()?,
            bind_addr: self.bind_addr()?,
            request_timeout: self.request_timeout()?,
            login: self.login_route()?,
            cookies: self.cookie_policy(),
            expiry_threshold_secs: self.expiry_threshold_secs()?,
        })
    }
}
