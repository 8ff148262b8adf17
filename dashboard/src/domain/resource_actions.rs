//! CRUD actions over one business resource of the upstream API.
//!
//! These are the collaborator calls the dashboard's list, form and delete
//! flows make. Each routes through [`AuthenticatedFetch`] and the response
//! unwrapper with a labelled [`ErrorContext`], so every failure reaches the
//! caller as a displayable [`Error`]. Payloads stay opaque JSON.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::authenticated_fetch::AuthenticatedFetch;
use super::{ApiRequest, Error, ErrorContext};

/// Default page requested by list calls.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size requested by list calls.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size forwarded upstream.
pub const MAX_LIMIT: u32 = 100;

/// Validation failures for resource names and record ids.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourcePathError {
    /// Resource name was blank.
    #[error("resource name must not be empty")]
    EmptyResource,
    /// A resource segment held characters outside `[a-z0-9_-]`.
    #[error("invalid resource segment {segment:?}")]
    InvalidSegment {
        /// Offending segment.
        segment: String,
    },
    /// Record id was blank or held characters outside `[A-Za-z0-9_-]`.
    #[error("invalid record id {id:?}")]
    InvalidId {
        /// Offending id.
        id: String,
    },
}

impl From<ResourcePathError> for Error {
    fn from(err: ResourcePathError) -> Self {
        Error::invalid_request(err.to_string())
    }
}

/// Validated resource path such as `employees` or `fleet/vehicles`.
///
/// # Examples
/// ```
/// use dashboard::domain::ResourceName;
///
/// let name = ResourceName::new("/fleet/vehicles/").unwrap();
/// assert_eq!(name.as_str(), "fleet/vehicles");
/// assert!(ResourceName::new("fleet/../users").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceName(String);

impl ResourceName {
    /// Validate `raw`. Leading and trailing slashes are ignored.
    pub fn new(raw: &str) -> Result<Self, ResourcePathError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ResourcePathError::EmptyResource);
        }
        if let Some(bad) = trimmed.split('/').find(|segment| {
            segment.is_empty()
                || !segment.bytes().all(|b| {
                    b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-'
                })
        }) {
            return Err(ResourcePathError::InvalidSegment {
                segment: bad.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Path without surrounding slashes.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_id(id: &str) -> Result<&str, ResourcePathError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(id)
    } else {
        Err(ResourcePathError::InvalidId { id: id.to_owned() })
    }
}

/// Pagination and search parameters for list calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// One-based page number.
    pub page: u32,
    /// Page size; clamped to `1..=100` when sent.
    pub limit: u32,
    /// Free-text search; omitted when blank.
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

impl ListQuery {
    fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = request
            .with_query("page", self.page.max(1).to_string())
            .with_query("limit", self.limit.clamp(1, MAX_LIMIT).to_string());
        match self.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => request.with_query("search", search),
            _ => request,
        }
    }
}

/// CRUD calls bound to one [`ResourceName`].
#[derive(Clone)]
pub struct ResourceActions {
    fetch: AuthenticatedFetch,
    resource: ResourceName,
}

impl ResourceActions {
    /// Bind `fetch` to `resource`.
    pub fn new(fetch: AuthenticatedFetch, resource: ResourceName) -> Self {
        Self { fetch, resource }
    }

    /// Bound resource.
    pub fn resource(&self) -> &ResourceName {
        &self.resource
    }

    fn collection_path(&self) -> String {
        format!("/api/{}", self.resource)
    }

    fn record_path(&self, id: &str) -> Result<String, Error> {
        let id = validate_id(id.trim())?;
        Ok(format!("/api/{}/{id}", self.resource))
    }

    async fn call(
        &self,
        op: &str,
        request: ApiRequest,
        default_message: &str,
    ) -> Result<Value, Error> {
        let context = ErrorContext::for_request(format!("resource_actions::{op}"), &request);
        self.fetch.fetch_json(request, &context, default_message).await
    }

    /// `GET /api/{resource}` with pagination and search.
    pub async fn list(&self, query: &ListQuery) -> Result<Value, Error> {
        let request = query.apply(ApiRequest::get(self.collection_path()).no_store());
        let message = format!("Failed to load {}", self.resource);
        self.call("list", request, &message).await
    }

    /// `GET /api/{resource}/{id}`.
    pub async fn get(&self, id: &str) -> Result<Value, Error> {
        let request = ApiRequest::get(self.record_path(id)?).no_store();
        let message = format!("Failed to load {} record", self.resource);
        self.call("get", request, &message).await
    }

    /// `POST /api/{resource}`.
    pub async fn create(&self, body: Value) -> Result<Value, Error> {
        let request = ApiRequest::post(self.collection_path()).with_json(body);
        let message = format!("Failed to create {} record", self.resource);
        self.call("create", request, &message).await
    }

    /// `PUT /api/{resource}/{id}`.
    pub async fn update(&self, id: &str, body: Value) -> Result<Value, Error> {
        let request = ApiRequest::put(self.record_path(id)?).with_json(body);
        let message = format!("Failed to update {} record", self.resource);
        self.call("update", request, &message).await
    }

    /// `DELETE /api/{resource}/{id}`.
    pub async fn delete(&self, id: &str) -> Result<Value, Error> {
        let request = ApiRequest::delete(self.record_path(id)?);
        let message = format!("Failed to delete {} record", self.resource);
        self.call("delete", request, &message).await
    }
}
