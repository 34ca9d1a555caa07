//! Checkout API client: request building, envelope unwrapping, token state.
//!
//! # Design
//! `CheckoutClient` owns its `ClientState`, so two clients never share a CSRF
//! token or an access-token registration. Each endpoint is split into a pure
//! `build_*` method that produces an `ApiRequest` and an async method that
//! executes it through the transport. `build_*` output can be asserted on
//! without any I/O.
//!
//! The smart API path (`call_api`) and the GraphQL path (`call_graphql`) are
//! parallel protocols: only the former sends state headers, rotates the CSRF
//! token, and checks ack/status.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::{ApiConfig, ACCESS_TOKEN_HEADER, CSRF_TOKEN_HEADER};
use crate::envelope::{check_graphql_errors, graphql_query, unwrap_envelope};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
use crate::state::ClientState;
use crate::types::{AuthResponse, OrderResponse};

/// A smart API call before state headers are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub method: HttpMethod,
    pub json: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            json: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            json: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }
}

/// Async client for the checkout smart API and GraphQL endpoint.
#[derive(Debug)]
pub struct CheckoutClient<T = ReqwestTransport> {
    config: ApiConfig,
    transport: T,
    state: ClientState,
}

impl CheckoutClient<ReqwestTransport> {
    /// Client over `reqwest` using the timeouts from `config`.
    pub fn new(config: ApiConfig) -> Self {
        let transport = ReqwestTransport::new(config.timeout, config.connect_timeout);
        Self::with_transport(config, transport)
    }

    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }
}

impl<T: HttpTransport> CheckoutClient<T> {
    pub fn with_transport(config: ApiConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            state: ClientState::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_get_auth(&self) -> ApiRequest {
        ApiRequest::get(&self.config.auth_uri)
    }

    pub fn build_get_order(&self, order_id: &str) -> ApiRequest {
        ApiRequest::get(format!("{}/{order_id}", self.config.order_uri))
    }

    pub fn build_capture_order(&self, order_id: &str) -> ApiRequest {
        ApiRequest::post(format!("{}/{order_id}/capture", self.config.order_uri))
    }

    pub fn build_authorize_order(&self, order_id: &str) -> ApiRequest {
        ApiRequest::post(format!("{}/{order_id}/authorize", self.config.order_uri))
    }

    /// The GraphQL POST for `fragment`. Carries no state headers.
    pub fn build_graphql(&self, fragment: &str) -> Result<HttpRequest, ApiError> {
        let body = json!({ "query": graphql_query(fragment) });
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.config.graphql_uri.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(serialize(&body)?),
        })
    }

    /// Attach default, CSRF, and source headers and serialize the body.
    async fn prepare(&self, request: ApiRequest) -> Result<HttpRequest, ApiError> {
        let mut headers = self.state.request_headers().await;
        let body = match request.json {
            Some(json) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serialize(&json)?)
            }
            None => None,
        };
        Ok(HttpRequest {
            method: request.method,
            url: request.url,
            headers,
            body,
        })
    }

    /// Execute a smart API request and unwrap its envelope to `data`.
    ///
    /// The CSRF token is replaced by the response's header (empty when
    /// absent) before the envelope is classified, so failed calls rotate it
    /// too.
    pub async fn call_api(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let request = self.prepare(request).await?;
        let url = request.url.clone();
        tracing::debug!(method = request.method.as_str(), %url, "calling smart api");

        let response = self.transport.send(request).await?;

        let token = response.header(CSRF_TOKEN_HEADER).unwrap_or_default().to_string();
        self.state.rotate_csrf_token(token).await;

        unwrap_envelope(&url, &response)
    }

    /// Run a GraphQL query fragment and deserialize the whole response body.
    pub async fn call_graphql<R: DeserializeOwned>(&self, fragment: &str) -> Result<R, ApiError> {
        let request = self.build_graphql(fragment)?;
        tracing::debug!(url = %request.url, "calling graphql");

        let response = self.transport.send(request).await?;
        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        check_graphql_errors(&body)?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub async fn get_auth(&self) -> Result<AuthResponse, ApiError> {
        self.call_api(self.build_get_auth()).await.map(AuthResponse)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<OrderResponse, ApiError> {
        self.call_api(self.build_get_order(order_id)).await.map(OrderResponse)
    }

    pub async fn capture_order(&self, order_id: &str) -> Result<OrderResponse, ApiError> {
        self.call_api(self.build_capture_order(order_id)).await.map(OrderResponse)
    }

    pub async fn authorize_order(&self, order_id: &str) -> Result<OrderResponse, ApiError> {
        self.call_api(self.build_authorize_order(order_id)).await.map(OrderResponse)
    }

    /// Register `access_token` as a default header and validate it with the
    /// auth endpoint.
    ///
    /// Runs at most once per client. Later calls, whatever token they pass,
    /// wait for and return the first call's outcome, including its error.
    pub async fn persist_access_token(&self, access_token: &str) -> Result<(), ApiError> {
        let token = access_token.to_string();
        self.state
            .registration()
            .get_or_init(|| async move {
                tracing::debug!("registering access token");
                self.state.set_default_header(ACCESS_TOKEN_HEADER, &token).await;
                self.get_auth().await.map(|_| ())
            })
            .await
            .clone()
    }
}

fn serialize(body: &Value) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}
