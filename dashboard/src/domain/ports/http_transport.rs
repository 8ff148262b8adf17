//! Driven port for sending requests to the dashboard REST API.
//!
//! Domain services build an [`ApiRequest`] and receive an [`ApiResponse`] for
//! any HTTP status. Only failures that produced no response at all surface as
//! [`HttpTransportError`].

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ApiRequest, ApiResponse};

define_port_error! {
    /// Errors raised before a response was received.
    pub enum HttpTransportError {
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "request timed out: {message}",
        /// The connection could not be established.
        Connect { message: String } =>
            "connection failed: {message}",
        /// Any other transport failure, including invalid request URLs.
        Transport { message: String } =>
            "transport failed: {message}",
    }
}

/// Port for executing HTTP requests against the API base URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the completed response.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpTransportError>;
}
