//! Error types for the journal client.

use thiserror::Error;

/// Errors that can occur when talking to the journal server.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection error (network failure, DNS resolution, timeout, etc.).
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP error status without a structured reply.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The server answered with a structured reply whose `ok` flag is falsy.
    #[error("request rejected by server: {payload}")]
    Rejected {
        /// The full reply, kept for diagnosis.
        payload: serde_json::Value,
    },

    /// Response deserialization error.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns `true` if this error is retryable.
    ///
    /// Connection errors and HTTP 5xx errors return `true`. A rejection is an
    /// application-level answer and is not retryable as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Rejected { .. } | Self::Deserialization(_) | Self::Configuration(_) => false,
        }
    }

    /// Returns `true` if the request failed below the application level:
    /// unreachable server, unstructured error status or unparseable reply.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Http { .. } | Self::Deserialization(_)
        )
    }

    /// Returns `true` if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the server rejected the request with `ok` falsy.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns the reply payload if this is a rejection.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Rejected { payload } => Some(payload),
            _ => None,
        }
    }
}
