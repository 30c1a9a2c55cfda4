//! Platform API error types.

use thiserror::Error;

/// Failures talking to the platform API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Client construction failed.
    #[error("Client error: {0}")]
    Client(String),

    /// Request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status without a decodable body.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}
