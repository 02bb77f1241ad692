//! Error types for pulltainer-client.

use thiserror::Error;

/// Failure of a single remote operation.
///
/// `operation` names the call (`list stacks`, `image status`, `stack file`,
/// `update stack`) so a log line is self-explanatory.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS, timeout, or body read failure.
    #[error("{operation}: transport error: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The response body is not the JSON shape we expect.
    #[error("{operation}: unexpected response body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Portainer answered with a non-success status.
    #[error("{operation}: rejected with HTTP {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The base URL cannot carry path segments.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn transport(operation: &'static str, message: impl Into<String>) -> Self {
        ApiError::Transport {
            operation,
            message: message.into(),
        }
    }

    pub fn rejected(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        ApiError::Rejected {
            operation,
            status,
            body: body.into(),
        }
    }

    pub fn operation(&self) -> Option<&'static str> {
        match self {
            ApiError::Transport { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::Rejected { operation, .. } => Some(*operation),
            ApiError::InvalidUrl(_) => None,
        }
    }
}
