//! Error types for the netrelay controller

use thiserror::Error;

/// Main error type for relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// The target URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request method is not a valid HTTP method token
    #[error("invalid method: {0}")]
    InvalidMethod(String),

    /// A header name or value cannot be represented on the wire
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The network primitive reported a connection or protocol failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The message channel to the caller is closed
    #[error("channel closed")]
    ChannelClosed,
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Convenience Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
