//! Response unwrapper: turn a completed upstream response into a payload or a
//! normalized [`Error`].

use serde_json::{Map, Value, json};

use super::error_message::{ErrorInput, ErrorNormalizer};
use super::{ApiResponse, Error, ErrorContext};

/// Message fragment used when a 2xx JSON body cannot be parsed.
pub const INVALID_JSON_MESSAGE: &str = "invalid JSON response";

fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Decode `response`, or build the normalized error for a non-2xx status.
///
/// - 204 or an empty 2xx body gives `{}`.
/// - A 2xx JSON body is parsed; a parse failure is an
///   [`ErrorCode::InvalidResponse`](super::ErrorCode::InvalidResponse) error.
/// - Any other 2xx body is wrapped as `{"message": text}` with `"` removed.
///
/// # Examples
/// ```
/// use dashboard::domain::{ApiResponse, ErrorContext, HttpMethod, unwrap_response};
/// use serde_json::json;
///
/// let context = ErrorContext::new("units::ping", "/api/ping", HttpMethod::Get);
/// let response = ApiResponse::new(200)
///     .with_header("content-type", "text/plain")
///     .with_body("ok");
/// assert_eq!(
///     unwrap_response(&response, "Ping failed", &context).unwrap(),
///     json!({ "message": "ok" })
/// );
/// ```
pub fn unwrap_response(
    response: &ApiResponse,
    default_message: &str,
    context: &ErrorContext,
) -> Result<Value, Error> {
    let status = response.status();
    if !response.is_success() {
        return Err(error_from_response(response, default_message, context));
    }

    let text = response.text();
    if status == 204 || text.trim().is_empty() {
        return Ok(empty_object());
    }

    if is_json_content_type(response.content_type()) {
        return serde_json::from_slice(response.body()).map_err(|err| {
            Error::invalid_response(format!("{default_message}: {INVALID_JSON_MESSAGE} ({err})"))
                .with_status(status)
        });
    }

    Ok(json!({ "message": text.replace('"', "") }))
}

fn error_from_response(
    response: &ApiResponse,
    default_message: &str,
    context: &ErrorContext,
) -> Error {
    let status = response.status();
    let text = response.text();
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.into_owned()))
    };

    let context = context.clone().with_status(status);
    let message = ErrorNormalizer::new()
        .with_context(&context)
        .with_fallback(default_message)
        .normalize(ErrorInput::Value(&body));
    Error::upstream(status, message)
}
