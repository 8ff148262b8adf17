//! Reqwest-backed transport for the dashboard REST API.
//!
//! This adapter owns transport details only: URL joining, header and body
//! serialisation, the request timeout, and mapping client failures onto
//! [`HttpTransportError`]. Status codes are returned untouched for the domain
//! to interpret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};

use crate::domain::ports::{HttpTransport, HttpTransportError};
use crate::domain::{ApiRequest, ApiResponse, HttpMethod};

const DEFAULT_USER_AGENT: &str = "dashboard-gateway/0.1";

/// Transport bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Configured API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, request: &ApiRequest) -> Result<Url, HttpTransportError> {
        let mut url = join_path(&self.base_url, request.path())?;
        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query());
        }
        Ok(url)
    }
}

fn join_path(base: &Url, path: &str) -> Result<Url, HttpTransportError> {
    if base.cannot_be_a_base() {
        return Err(HttpTransportError::transport(format!(
            "base URL {base} cannot carry a path"
        )));
    }
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    let suffix = path.trim_start_matches('/');
    url.set_path(&format!("{prefix}/{suffix}"));
    url.set_query(None);
    Ok(url)
}

fn method_for(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpTransportError> {
        let url = self.resolve(&request)?;
        let mut builder = self.client.request(method_for(request.method()), url);
        for (name, value) in request.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| HttpTransportError::transport(format!("header {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| HttpTransportError::transport(format!("header {name}: {err}")))?;
            builder = builder.header(name, value);
        }
        if request.is_no_store() {
            builder = builder.header(CACHE_CONTROL, "no-store");
        }
        if let Some(body) = request.body() {
            if request.header(CONTENT_TYPE.as_str()).is_none() {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|text| (name.as_str().to_owned(), text.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(map_transport_error)?;

        Ok(headers
            .into_iter()
            .fold(ApiResponse::new(status), |acc, (name, value)| {
                acc.with_header(&name, value)
            })
            .with_body(body.to_vec()))
    }
}

fn map_transport_error(error: reqwest::Error) -> HttpTransportError {
    if error.is_timeout() {
        HttpTransportError::timeout(error.to_string())
    } else if error.is_connect() {
        HttpTransportError::connect(error.to_string())
    } else {
        HttpTransportError::transport(error.to_string())
    }
}
