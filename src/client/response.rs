//! The uniform envelope every remote call returns.
//!
//! A [`Response`] is built from the upstream status and body on success,
//! or from [`FAILURE_BODY`] when the upstream could not be reached, so
//! callers always get something to inspect. Once populated with a
//! non-empty body the status and body never change; decoding reads the
//! stored body and leaves it untouched.
//!
//! Bodies are kept as text. An upstream body that is not valid UTF-8 is
//! stored with each invalid sequence replaced by U+FFFD, so [`Response::body`]
//! differs from the bytes on the wire in that case.

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Body substituted when a call never got a response from the upstream.
pub const FAILURE_BODY: &str = r#"{"status": 900, "msg": "failed", "data": ""}"#;

/// Domain status carried in [`FAILURE_BODY`]: the upstream was not reached.
pub const UNREACHABLE_STATUS: i64 = 900;

/// HTTP status recorded when a body is set without an explicit one.
pub const DEFAULT_HTTP_STATUS: StatusCode = StatusCode::BAD_GATEWAY;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    http_status: u16,
    body: String,
    fields: Map<String, Value>,
}

impl Response {
    /// An unpopulated response: status `0`, empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `Response::new()` followed by [`set_body`](Self::set_body).
    #[must_use]
    pub fn with_body(body: impl Into<String>, status: Option<u16>) -> Self {
        let mut response = Self::new();
        response.set_body(body, status);
        response
    }

    /// Populate the response. `status` defaults to 502.
    ///
    /// An empty `body` leaves the response as it was, and so does any call
    /// after the first non-empty one. Top-level keys of a JSON object body
    /// are merged into [`fields`](Self::fields); a body that is not a JSON
    /// object is stored as-is.
    pub fn set_body(&mut self, body: impl Into<String>, status: Option<u16>) -> &mut Self {
        let body = body.into();
        if body.is_empty() || self.is_populated() {
            return self;
        }

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
            self.fields.extend(map);
        }

        self.http_status = status.unwrap_or(DEFAULT_HTTP_STATUS.as_u16());
        self.body = body;
        self
    }

    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        !self.body.is_empty()
    }

    /// Top-level fields of the body when it is a JSON object.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The body's top-level `code` field, when it is an integer.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.field("code").and_then(Value::as_i64)
    }

    /// Whether this is the synthetic response for a call that never reached
    /// the upstream.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        self.field("status").and_then(Value::as_i64) == Some(UNREACHABLE_STATUS)
    }

    /// Decode the body into `T`. Can be called any number of times with
    /// different target types.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
