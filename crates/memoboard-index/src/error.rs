//! Index error types.

use memoboard_core::MemoError;
use thiserror::Error;

/// Errors raised by a feed index backend.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend refused the operation.
    #[error("Index unavailable: {0}")]
    Unavailable(String),
}

impl IndexError {
    /// Returns true if the failure is about reaching the backend rather
    /// than a rejected command.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Redis(e) => e.is_io_error() || e.is_connection_dropped() || e.is_timeout(),
            Self::Pool(_) | Self::Unavailable(_) => true,
            Self::Configuration(_) => false,
        }
    }
}

impl From<IndexError> for MemoError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Configuration(message) => Self::Configuration(message),
            other => Self::Index(other.to_string()),
        }
    }
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
