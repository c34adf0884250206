//! Error types for the API client.

use crate::transport::ApiResponse;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures below HTTP: no response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("Network Error: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built (bad URL, bad configuration).
    #[error("Invalid request: {0}")]
    Build(String),

    /// Any other transport failure, carrying the transport's own message.
    #[error("{0}")]
    Request(String),
}

/// Failures of the client-side credential store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Reading or writing the backing file failed.
    #[error("Credential storage I/O failed: {0}")]
    Io(String),

    /// The backing file is not a JSON object of strings.
    #[error("Credential storage is corrupt: {0}")]
    Format(String),
}

/// Invalid client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is not an absolute `http(s)` URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Everything an API call can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `message` field of a JSON error body, if there was one.
        message: Option<String>,
        /// Raw body text.
        body: String,
    },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// The credential store failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Build a [`ApiError::Status`] from a non-2xx response, extracting the
    /// server's `message` when the body is a JSON object carrying one.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.message);

        Self::Status {
            status: response.status,
            message,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Server-supplied message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
