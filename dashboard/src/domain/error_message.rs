//! Error normalizer: reduce any failure to one human-readable string.
//!
//! Upstream error bodies follow no single schema. [`ApiErrorShape::parse`]
//! tries each known shape in priority order and falls back to a generic
//! variant, so matching is exhaustive. [`ErrorNormalizer`] then filters
//! framework and transport noise, substitutes status-appropriate fallbacks,
//! and appends the [`ErrorContext`] diagnostic block.

use serde_json::{Map, Value};

use super::error_context::ErrorContext;

/// Last-resort message when nothing usable was found.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Message shown when a request never reached the server.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";

/// Lower-cased fragments of messages that must never reach end users.
const INTERNAL_NOISE_PATTERNS: &[&str] = &[
    "server components render",
    "digest:",
    "failed to fetch",
    "fetch failed",
    "error sending request",
];

const ALTERNATE_MESSAGE_KEYS: [&str; 4] = ["msg", "description", "detail", "reason"];

/// A value to extract a message from.
#[derive(Debug, Clone, Copy)]
pub enum ErrorInput<'a> {
    /// A native Rust error; its `Display` text is the candidate message.
    Error(&'a (dyn std::error::Error + 'a)),
    /// A parsed response body.
    Value(&'a Value),
    /// Plain text.
    Text(&'a str),
}

/// Known server error body shapes, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorShape {
    /// `{ "message": "..." }`
    Message(String),
    /// `{ "error": "..." }` or `{ "error": { "message": "..." } }`
    Error(String),
    /// `{ "details": ... }`
    Details(String),
    /// `{ "errors": [...] }` or `{ "errors": { "field": [...] } }`
    Errors(Vec<String>),
    /// One of `msg`, `description`, `detail`, `reason`.
    Alternate(String),
    /// An object or scalar with no recognised field, rendered as JSON.
    Opaque(String),
    /// A bare string body.
    Text(String),
    /// Nothing usable.
    Unknown,
}

impl ApiErrorShape {
    /// Classify `value`.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::ApiErrorShape;
    /// use serde_json::json;
    ///
    /// let shape = ApiErrorShape::parse(&json!({ "errors": { "plate": ["required"] } }));
    /// assert_eq!(shape, ApiErrorShape::Errors(vec!["required".to_owned()]));
    /// ```
    #[must_use]
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::parse_object(map),
            Value::String(text) => non_blank(text).map_or(Self::Unknown, Self::Text),
            Value::Null => Self::Unknown,
            other => Self::Opaque(other.to_string()),
        }
    }

    fn parse_object(map: &Map<String, Value>) -> Self {
        if let Some(message) = map.get("message").and_then(text_field) {
            return Self::Message(message);
        }
        if let Some(error) = map.get("error").and_then(nested_error_field) {
            return Self::Error(error);
        }
        if let Some(details) = map.get("details").and_then(rendered_field) {
            return Self::Details(details);
        }
        if let Some(errors) = map.get("errors").and_then(flatten_errors) {
            return Self::Errors(errors);
        }
        if let Some(alternate) = ALTERNATE_MESSAGE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(text_field))
        {
            return Self::Alternate(alternate);
        }
        if map.is_empty() {
            Self::Unknown
        } else {
            Self::Opaque(Value::Object(map.clone()).to_string())
        }
    }

    /// The display message carried by this shape, if any.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        match self {
            Self::Message(text)
            | Self::Error(text)
            | Self::Details(text)
            | Self::Alternate(text)
            | Self::Opaque(text)
            | Self::Text(text) => Some(text),
            Self::Errors(list) => Some(list.join(", ")),
            Self::Unknown => None,
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn text_field(value: &Value) -> Option<String> {
    value.as_str().and_then(non_blank)
}

fn rendered_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => non_blank(text),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

fn nested_error_field(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("message")
            .and_then(text_field)
            .or_else(|| rendered_field(value)),
        other => rendered_field(other),
    }
}

fn flatten_errors(value: &Value) -> Option<Vec<String>> {
    let mut messages = Vec::new();
    match value {
        Value::Array(items) => items.iter().for_each(|item| push_error_item(item, &mut messages)),
        Value::Object(map) => {
            for entry in map.values() {
                match entry {
                    Value::Array(items) => {
                        items.iter().for_each(|item| push_error_item(item, &mut messages));
                    }
                    other => push_error_item(other, &mut messages),
                }
            }
        }
        other => push_error_item(other, &mut messages),
    }
    (!messages.is_empty()).then_some(messages)
}

fn push_error_item(item: &Value, messages: &mut Vec<String>) {
    let message = match item {
        Value::Object(map) => map
            .get("message")
            .and_then(text_field)
            .or_else(|| rendered_field(item)),
        other => rendered_field(other),
    };
    messages.extend(message);
}

fn is_internal_noise(message: &str) -> bool {
    let lowered = message.to_lowercase();
    INTERNAL_NOISE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

fn status_from_body(value: &Value) -> Option<u16> {
    ["statusCode", "status"].iter().find_map(|key| {
        let field = value.get(*key)?;
        field
            .as_u64()
            .or_else(|| field.as_str().and_then(|text| text.trim().parse().ok()))
            .and_then(|status| u16::try_from(status).ok())
            .filter(|status| (100..=599).contains(status))
    })
}

/// User-facing fallback for a status when the server said nothing useful.
#[must_use]
pub fn status_fallback_message(status: u16) -> String {
    let text = match status {
        400 => "The request was invalid. Check the submitted data and try again.",
        401 => "Your session has expired. Please log in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        409 => "The request conflicts with the current state of the resource.",
        422 => "The submitted data failed validation.",
        429 => "Too many requests. Please wait a moment and try again.",
        500..=599 => "The server encountered an error. Please try again later.",
        other => return format!("Request failed with status {other}."),
    };
    text.to_owned()
}

/// Configurable message extraction.
///
/// # Examples
/// ```
/// use dashboard::domain::{ErrorContext, ErrorInput, ErrorNormalizer, HttpMethod};
/// use serde_json::json;
///
/// let body = json!({ "statusCode": 404, "message": "Not found" });
/// let context = ErrorContext::new("x", "/y", HttpMethod::Get);
/// let message = ErrorNormalizer::new()
///     .with_context(&context)
///     .normalize(ErrorInput::Value(&body));
///
/// assert!(message.starts_with("Not found"));
/// assert!(message.contains("Endpoint: /y"));
/// assert!(message.contains("Status: 404"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorNormalizer<'a> {
    context: Option<&'a ErrorContext>,
    fallback: Option<&'a str>,
}

impl<'a> ErrorNormalizer<'a> {
    /// Normalizer with no context and no caller fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the diagnostic block for `context`.
    #[must_use]
    pub fn with_context(mut self, context: &'a ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Use `fallback` when the input carries no message at all.
    #[must_use]
    pub fn with_fallback(mut self, fallback: &'a str) -> Self {
        self.fallback = non_blank_ref(fallback);
        self
    }

    /// Produce the best display string for `input`.
    #[must_use]
    pub fn normalize(&self, input: ErrorInput<'_>) -> String {
        let (candidate, body_status) = match input {
            ErrorInput::Error(error) => (non_blank(&error.to_string()), None),
            ErrorInput::Value(value) => (
                ApiErrorShape::parse(value).into_message(),
                status_from_body(value),
            ),
            ErrorInput::Text(text) => (non_blank(text), None),
        };
        let status = self
            .context
            .and_then(ErrorContext::status)
            .or(body_status);

        let primary = match candidate {
            Some(message) if !is_internal_noise(&message) => message,
            Some(_) => status.map_or_else(
                || NETWORK_ERROR_MESSAGE.to_owned(),
                status_fallback_message,
            ),
            None => match (self.fallback, status) {
                (Some(fallback), _) => fallback.to_owned(),
                (None, Some(status)) => status_fallback_message(status),
                (None, None) => UNKNOWN_ERROR_MESSAGE.to_owned(),
            },
        };

        match self.context {
            Some(context) => {
                let context = match (context.status(), status) {
                    (None, Some(status)) => context.clone().with_status(status),
                    _ => context.clone(),
                };
                format!("{primary}\n\n{context}")
            }
            None => primary,
        }
    }
}

fn non_blank_ref(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Normalize `input`, appending `context` diagnostics when supplied.
///
/// # Examples
/// ```
/// use dashboard::domain::{normalize_error_message, ErrorInput};
/// use serde_json::json;
///
/// let body = json!({ "errors": { "registration": ["required"] } });
/// assert_eq!(normalize_error_message(ErrorInput::Value(&body), None), "required");
/// ```
#[must_use]
pub fn normalize_error_message(input: ErrorInput<'_>, context: Option<&ErrorContext>) -> String {
    match context {
        Some(context) => ErrorNormalizer::new().with_context(context).normalize(input),
        None => ErrorNormalizer::new().normalize(input),
    }
}
