//! Error types for the checkout API client.
//!
//! # Design
//! The first four variants mirror the outcomes of the response envelope
//! protocol and are checked in a fixed order (contingency, status, ack). The
//! rest cover failures around the protocol: the transport could not produce a
//! response, or a payload could not be (de)serialized.
//!
//! `ApiError` is `Clone` because the access-token registration hands the same
//! settled outcome to every caller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The body carried `ack: "contingency"`. Holds the contingency payload.
    #[error("{0}")]
    Contingency(String),

    /// The server returned a status above 400 without a contingency ack.
    #[error("Api: {url} returned status code: {status}")]
    HttpStatus { url: String, status: u16 },

    /// The ack was neither `success` nor `contingency`.
    #[error("Api: {url} returned ack: {ack}")]
    Ack { url: String, ack: String },

    /// At least one GraphQL error remained after filtering ignorable ones.
    #[error("{0}")]
    GraphQl(String),

    /// No response was obtained from the transport.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}
