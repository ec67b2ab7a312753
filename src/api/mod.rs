//! Marketplace API transport

use thiserror::Error;

pub mod client;

pub use client::HttpMarketplaceClient;

/// Errors talking to the marketplace backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success HTTP status (status, body).
    #[error("request failed with status {0}: {1}")]
    Status(u16, String),

    /// The body could not be decoded.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::UnexpectedResponse(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}
