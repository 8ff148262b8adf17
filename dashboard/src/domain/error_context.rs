//! Diagnostic context attached to a failed call.

use std::fmt;

use super::http::{ApiRequest, HttpMethod};

/// Where a failure happened: call-site label, endpoint, verb and status.
///
/// The [`fmt::Display`] form is the developer-facing block appended to
/// normalized messages.
///
/// # Examples
/// ```
/// use dashboard::domain::{ErrorContext, HttpMethod};
///
/// let context = ErrorContext::new("fleet::list", "/api/vehicles", HttpMethod::Get)
///     .with_status(503);
/// assert_eq!(
///     context.to_string(),
///     "Details:\n  File: fleet::list\n  Endpoint: /api/vehicles\n  Method: GET\n  Status: 503"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    source: String,
    endpoint: String,
    method: HttpMethod,
    status: Option<u16>,
}

impl ErrorContext {
    /// Build a context for `source` calling `endpoint` with `method`.
    pub fn new(source: impl Into<String>, endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            source: source.into(),
            endpoint: endpoint.into(),
            method,
            status: None,
        }
    }

    /// Build a context from the request about to be sent.
    pub fn for_request(source: impl Into<String>, request: &ApiRequest) -> Self {
        Self::new(source, request.path(), request.method())
    }

    /// Record the response status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Call-site label.
    #[must_use]
    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    /// Endpoint path.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// HTTP verb.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Response status, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Details:\n  File: {}\n  Endpoint: {}\n  Method: {}",
            self.source, self.endpoint, self.method
        )?;
        if let Some(status) = self.status {
            write!(f, "\n  Status: {status}")?;
        }
        Ok(())
    }
}
