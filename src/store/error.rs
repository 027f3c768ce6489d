//! Store error taxonomy and its mapping onto failure categories.

use std::io;

use thiserror::Error;

use crate::resilience::failure::{classify, ClassifiedFailure, Classify, FailureCategory};

/// Errors raised by a store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store is contended; try again later.
    #[error("store busy: {0}")]
    Busy(String),

    /// Store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Request was interrupted before completion.
    #[error("request interrupted: {0}")]
    Interrupted(String),

    /// Database, attribute or entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transaction data was rejected.
    #[error("invalid transaction: {0}")]
    InvalidTx(String),

    /// Query is malformed for the current schema.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Store URI scheme has no client.
    #[error("unsupported store uri: {0}")]
    Unsupported(String),

    #[error("persistence error: {0}")]
    Io(#[source] io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock => StoreError::Busy(err.to_string()),
            io::ErrorKind::Interrupted => StoreError::Interrupted(err.to_string()),
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::TimedOut => StoreError::Unavailable(err.to_string()),
            io::ErrorKind::NotFound => StoreError::NotFound(err.to_string()),
            _ => StoreError::Io(err),
        }
    }
}

impl Classify for StoreError {
    fn category(&self) -> FailureCategory {
        match self {
            StoreError::Busy(_) => FailureCategory::Busy,
            StoreError::Unavailable(_) => FailureCategory::Unavailable,
            StoreError::Interrupted(_) => FailureCategory::Interrupted,
            StoreError::NotFound(_) => FailureCategory::NotFound,
            _ => FailureCategory::Other,
        }
    }
}

impl From<StoreError> for ClassifiedFailure {
    fn from(err: StoreError) -> Self {
        classify(err)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
