//! Mutable state shared by every request a `CheckoutClient` issues.
//!
//! # Design
//! - `csrf_token` is overwritten by every smart API response. Concurrent
//!   requests race on it and the last response processed wins; nothing orders
//!   writes by request issue time.
//! - `default_headers` only grows. It is merged into every smart API request
//!   before the CSRF and source headers.
//! - `registration` is a one-time cell holding the settled outcome of the
//!   access-token registration.

use std::collections::BTreeMap;

use tokio::sync::{OnceCell, RwLock};

use crate::config::{CSRF_TOKEN_HEADER, SOURCE_HEADER, SOURCE_VALUE};
use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct ClientState {
    default_headers: RwLock<BTreeMap<String, String>>,
    csrf_token: RwLock<String>,
    registration: OnceCell<Result<(), ApiError>>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers for the next smart API request: defaults, then the current
    /// CSRF token, then the source tag.
    pub async fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.default_headers.read().await.clone();
        headers.insert(CSRF_TOKEN_HEADER.to_string(), self.csrf_token().await);
        headers.insert(SOURCE_HEADER.to_string(), SOURCE_VALUE.to_string());
        headers.into_iter().collect()
    }

    pub async fn set_default_header(&self, name: &str, value: &str) {
        self.default_headers
            .write()
            .await
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub async fn default_header(&self, name: &str) -> Option<String> {
        self.default_headers
            .read()
            .await
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    pub async fn csrf_token(&self) -> String {
        self.csrf_token.read().await.clone()
    }

    pub async fn rotate_csrf_token(&self, token: String) {
        tracing::trace!(empty = token.is_empty(), "rotating csrf token");
        *self.csrf_token.write().await = token;
    }

    pub(crate) fn registration(&self) -> &OnceCell<Result<(), ApiError>> {
        &self.registration
    }

    /// True once an access-token registration has settled successfully.
    pub fn is_access_token_registered(&self) -> bool {
        matches!(self.registration.get(), Some(Ok(())))
    }
}
