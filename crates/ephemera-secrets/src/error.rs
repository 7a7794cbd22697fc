//! Error types for the secret lifecycle.

use thiserror::Error;

/// Errors that can occur during secret operations.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("{0}")]
    Validation(String),

    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("bad password")]
    Authentication,

    /// The record changed between read and write back.
    #[error("secret {0} was modified concurrently")]
    StaleWrite(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("storage error during {op}: {message}")]
    Storage { op: &'static str, message: String },
}

/// How a transport should present an error to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientFault,
    NotFound,
    Unauthorized,
    Internal,
}

impl SecretError {
    pub fn storage(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            op,
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ClientFault,
            Self::NotFound(_) | Self::StaleWrite(_) => ErrorKind::NotFound,
            Self::Authentication => ErrorKind::Unauthorized,
            Self::Crypto(_) | Self::Storage { .. } => ErrorKind::Internal,
        }
    }
}

/// Convenience result alias for secret operations.
pub type Result<T> = std::result::Result<T, SecretError>;
