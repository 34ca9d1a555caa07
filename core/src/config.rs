//! Endpoint URIs, header names, and transport timeouts.

use std::env;
use std::time::Duration;

/// Response and request header carrying the rotating CSRF token.
pub const CSRF_TOKEN_HEADER: &str = "x-csrf-jwt";

/// Header tagging every REST request with its originating client.
pub const SOURCE_HEADER: &str = "x-source";

/// Value sent in `SOURCE_HEADER`.
pub const SOURCE_VALUE: &str = "smart_buttons";

/// Default header under which a registered access token is sent.
pub const ACCESS_TOKEN_HEADER: &str = "x-paypal-internal-euat";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Absolute URIs of the backend endpoints plus transport timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub auth_uri: String,
    pub order_uri: String,
    pub graphql_uri: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ApiConfig {
    /// Derive every endpoint from a single base URL.
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            auth_uri: format!("{base}/smart/api/auth"),
            order_uri: format!("{base}/smart/api/order"),
            graphql_uri: format!("{base}/graphql"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Read configuration from the environment.
    ///
    /// `CHECKOUT_API_BASE_URL` seeds all three endpoints; `CHECKOUT_AUTH_URI`,
    /// `CHECKOUT_ORDER_URI` and `CHECKOUT_GRAPHQL_URI` override them one by
    /// one. `CHECKOUT_TIMEOUT_SECS` sets the request timeout.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = lookup("CHECKOUT_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base);

        if let Some(uri) = lookup("CHECKOUT_AUTH_URI") {
            config.auth_uri = uri.trim_end_matches('/').to_string();
        }
        if let Some(uri) = lookup("CHECKOUT_ORDER_URI") {
            config.order_uri = uri.trim_end_matches('/').to_string();
        }
        if let Some(uri) = lookup("CHECKOUT_GRAPHQL_URI") {
            config.graphql_uri = uri;
        }
        if let Some(secs) = lookup("CHECKOUT_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
