//! Response envelope protocol for the smart API and the GraphQL endpoint.
//!
//! # Design
//! REST responses wrap their payload as `{ ack, data, contingency }`. The
//! ack is parsed into a tagged `Ack` so the classification below matches on
//! variants instead of comparing strings. Classification is a pure function of
//! the response; CSRF rotation happens in the client before it is called.
//!
//! GraphQL responses follow a separate protocol: the ack and status are
//! ignored, only `errors` matters.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// GraphQL error message the backend emits for guest buyers. Never fatal.
pub const IGNORABLE_GRAPHQL_ERROR: &str = "ACCOUNT_CANNOT_BE_FETCHED";

/// Logical outcome reported by the `ack` field.
///
/// A non-string ack is kept as its JSON text in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Success,
    Contingency,
    Other(String),
}

impl From<String> for Ack {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Ack::Success,
            "contingency" => Ack::Contingency,
            _ => Ack::Other(value),
        }
    }
}

impl<'de> Deserialize<'de> for Ack {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Ack::from(s),
            other => Ack::Other(other.to_string()),
        })
    }
}

/// The `{ ack, data, contingency }` body of a smart API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub ack: Option<Ack>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub contingency: Option<Value>,
}

impl ApiEnvelope {
    fn contingency_message(&self) -> String {
        match &self.contingency {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Classify a smart API response and extract its `data`.
///
/// Checks run in a fixed order: a contingency ack wins over a failing status,
/// which wins over an unexpected ack. An absent `data` resolves to `null`.
pub fn unwrap_envelope(url: &str, response: &HttpResponse) -> Result<Value, ApiError> {
    let envelope: ApiEnvelope = match serde_json::from_str(&response.body) {
        Ok(envelope) => envelope,
        Err(_) if response.status > 400 => {
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        Err(e) => return Err(ApiError::Deserialization(e.to_string())),
    };

    if envelope.ack == Some(Ack::Contingency) {
        return Err(ApiError::Contingency(envelope.contingency_message()));
    }

    if response.status > 400 {
        return Err(ApiError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    match envelope.ack {
        Some(Ack::Success) => Ok(envelope.data.unwrap_or(Value::Null)),
        Some(Ack::Other(ack)) => Err(ApiError::Ack {
            url: url.to_string(),
            ack,
        }),
        // Contingency returned above.
        Some(Ack::Contingency) | None => Err(ApiError::Ack {
            url: url.to_string(),
            ack: "undefined".to_string(),
        }),
    }
}

/// Wrap a selection fragment in an anonymous GraphQL query.
pub fn graphql_query(fragment: &str) -> String {
    format!("query {{ {} }}", fragment.trim())
}

/// Fail if the GraphQL body carries any error other than the ignorable one.
///
/// The message is the first remaining error's `message`, or the serialized
/// error when the message is missing, empty, or falsy. An `errors` field that
/// is neither null nor an array is a deserialization error.
pub fn check_graphql_errors(body: &Value) -> Result<(), ApiError> {
    let errors = match body.get("errors") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(errors)) => errors,
        Some(other) => {
            tracing::debug!(%other, "graphql errors field is not an array");
            return Err(ApiError::Deserialization(format!(
                "graphql errors is not an array: {other}"
            )));
        }
    };

    let mut remaining = errors.iter().filter(|error| {
        let ignorable = error.get("message").and_then(Value::as_str) == Some(IGNORABLE_GRAPHQL_ERROR);
        if ignorable {
            tracing::trace!("ignoring {IGNORABLE_GRAPHQL_ERROR} graphql error");
        }
        !ignorable
    });

    match remaining.next() {
        None => Ok(()),
        Some(error) => {
            let message = match error.get("message") {
                Some(Value::String(m)) if !m.is_empty() => m.clone(),
                Some(m) if !is_falsy(m) => m.to_string(),
                _ => error.to_string(),
            };
            Err(ApiError::GraphQl(message))
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => false,
    }
}
