//! Payload types returned by the typed endpoints.
//!
//! # Design
//! The backend owns these shapes and they vary by checkout flow, so both
//! types wrap the raw `data` JSON unchanged. Accessors cover the fields
//! callers commonly read without committing to a full schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of the auth endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthResponse(pub Value);

/// Payload of the order, capture, and authorize endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderResponse(pub Value);

impl OrderResponse {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl AuthResponse {
    pub fn into_inner(self) -> Value {
        self.0
    }
}
