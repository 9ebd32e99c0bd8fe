//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::SchemaError;

/// Application errors: the three failure kinds of a generate/parse round
/// trip, plus configuration problems.
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    /// Connection refused, timeout, DNS failure or unreadable body.
    #[error("transport error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The inference server answered with a 4xx or 5xx status.
    #[error("inference server returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    pub fn transport(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApplicationError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
