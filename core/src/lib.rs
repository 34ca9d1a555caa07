//! Async API client core for the checkout smart API.
//!
//! # Overview
//! Wraps the checkout backend's REST-like smart API and its GraphQL endpoint.
//! Every smart API response is unwrapped from the `{ ack, data, contingency }`
//! envelope and classified into data or an `ApiError`. The client also keeps
//! a rotating CSRF token and a one-time access-token registration.
//!
//! # Design
//! - `CheckoutClient` holds an `ApiConfig`, an `HttpTransport`, and its own
//!   `ClientState`; no state is process-global.
//! - Endpoints are split into pure `build_*` methods and async executors, so
//!   request shapes are testable without I/O.
//! - Envelope classification lives in `envelope` as pure functions over
//!   `HttpResponse`.
//! - The transport is a trait; `ReqwestTransport` is the production
//!   implementation.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod state;
pub mod types;

pub use client::{ApiRequest, CheckoutClient};
pub use config::ApiConfig;
pub use envelope::{Ack, ApiEnvelope};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use state::ClientState;
pub use types::{AuthResponse, OrderResponse};
