//! Error types for the `jargone-model` crate.

use thiserror::Error;

/// Errors that can occur while calling a generative model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request never produced an HTTP response.
    #[error("Request error ({provider}): {message}")]
    Request {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("API error ({provider}, status {status}): {message}")]
    Api {
        /// The provider that produced the error.
        provider: String,
        /// The HTTP status code.
        status: u16,
        /// The error message decoded from the response body.
        message: String,
    },

    /// No answer within the request timeout.
    #[error("Timeout ({provider}): {message}")]
    Timeout {
        /// The provider that timed out.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The response body could not be decoded or held no completion.
    #[error("Invalid response ({provider}): {message}")]
    InvalidResponse {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, transport failures, rate limits and server errors are retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Request { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse { .. } | Self::Config(_) => false,
        }
    }

    /// Whether the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
