//! Test utilities for the dashboard crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::ports::{HttpTransport, HttpTransportError};
use crate::domain::{ApiRequest, ApiResponse};

/// Clock pinned to a settable instant.
pub struct FixtureClock(Mutex<DateTime<Utc>>);

impl FixtureClock {
    /// Clock reading `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock reading `seconds` since the Unix epoch.
    pub fn at_timestamp(seconds: i64) -> Self {
        match DateTime::<Utc>::from_timestamp(seconds, 0) {
            Some(now) => Self::new(now),
            None => panic!("timestamp {seconds} is out of range"),
        }
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Unsigned JWT-shaped token with `payload` as its claims segment.
pub fn jwt_with_payload(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

/// Unsigned JWT-shaped token expiring at `exp` seconds since the epoch.
pub fn jwt_with_exp(exp: i64) -> String {
    jwt_with_payload(&json!({ "sub": "operator-1", "exp": exp }))
}

/// Transport double that replays scripted replies and records every request.
///
/// Replies are consumed in order. Once the script runs out the transport
/// answers with a connect error.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ApiResponse, HttpTransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    #[must_use]
    pub fn reply(self, response: ApiResponse) -> Self {
        lock(&self.replies, "replies").push_back(Ok(response));
        self
    }

    /// Queue a JSON response.
    #[must_use]
    pub fn reply_json(self, status: u16, body: &Value) -> Self {
        self.reply(ApiResponse::json(status, body))
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn fail(self, error: HttpTransportError) -> Self {
        lock(&self.replies, "replies").push_back(Err(error));
        self
    }

    /// Requests sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests, "requests").clone()
    }

    /// Paths of requests sent so far, in order.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.path().to_owned())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpTransportError> {
        lock(&self.requests, "requests").push(request);
        lock(&self.replies, "replies")
            .pop_front()
            .unwrap_or_else(|| Err(HttpTransportError::connect("no scripted reply left")))
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex"),
    }
}
