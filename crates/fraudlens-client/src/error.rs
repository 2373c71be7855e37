//! Error types for fraudlens-client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientErrorCode {
    Timeout,
    Unreachable,
    ServerError,
    RequestError,
    DecodeError,
    InvalidResponse,
}

impl std::fmt::Display for ClientErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientErrorCode::Timeout => write!(f, "TIMEOUT"),
            ClientErrorCode::Unreachable => write!(f, "UNREACHABLE"),
            ClientErrorCode::ServerError => write!(f, "SERVER_ERROR"),
            ClientErrorCode::RequestError => write!(f, "REQUEST_ERROR"),
            ClientErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
            ClientErrorCode::InvalidResponse => write!(f, "INVALID_RESPONSE"),
        }
    }
}

/// Failure talking to a remote collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request exceeded its time bound
    #[error("Request timed out")]
    Timeout,

    /// No response was received
    #[error("Collaborator unreachable: {message}")]
    Unreachable { message: String },

    /// The collaborator answered with a failure status
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    /// The request could not be constructed or issued
    #[error("Request error: {message}")]
    Request { message: String },

    /// The response body could not be decoded
    #[error("Failed to parse response: {message}")]
    Decode { message: String },

    /// The response decoded but violates its invariants
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl ClientError {
    /// Get the error code
    pub fn code(&self) -> ClientErrorCode {
        match self {
            ClientError::Timeout => ClientErrorCode::Timeout,
            ClientError::Unreachable { .. } => ClientErrorCode::Unreachable,
            ClientError::Server { .. } => ClientErrorCode::ServerError,
            ClientError::Request { .. } => ClientErrorCode::RequestError,
            ClientError::Decode { .. } => ClientErrorCode::DecodeError,
            ClientError::InvalidResponse { .. } => ClientErrorCode::InvalidResponse,
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout | ClientError::Unreachable { .. } => true,
            ClientError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ClientError::Timeout
        } else if error.is_builder() {
            ClientError::Request { message: error.to_string() }
        } else if error.is_connect() || error.is_request() {
            ClientError::Unreachable { message: error.to_string() }
        } else if error.is_decode() || error.is_body() {
            ClientError::Decode { message: error.to_string() }
        } else {
            ClientError::Request { message: error.to_string() }
        }
    }
}

/// Result type with ClientError
pub type ClientResult<T> = Result<T, ClientError>;
