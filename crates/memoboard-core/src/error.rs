//! Unified error types for the storage core.

use crate::MemoId;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Memoboard.
///
/// Store-level failures are never swallowed: they travel up to the feed
/// assembler, which decides whether to fail the request or degrade.
#[derive(Error, Debug)]
pub enum MemoError {
    // ============ Domain Outcomes ============
    /// Resource not found, or hidden by visibility rules.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Malformed input, rejected before any store call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Username/password pair did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ============ Relational Store ============
    /// Pool or connection level failure (unreachable store, acquire timeout).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Query level failure (constraint violation, malformed row).
    #[error("Database error: {0}")]
    Database(String),

    // ============ Secondary Index ============
    /// The index store rejected a command or could not be reached.
    #[error("Index error: {0}")]
    Index(String),

    /// The durable insert succeeded but the feed index was not updated.
    #[error("Index inconsistency for memo {memo_id}: {message}")]
    IndexInconsistency { memo_id: MemoId, message: String },

    // ============ Infrastructure ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemoError {
    /// Returns the HTTP-equivalent status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::InvalidCredentials => 401,
            Self::StoreUnavailable(_) => 503,
            Self::Database(_)
            | Self::Index(_)
            | Self::IndexInconsistency { .. }
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Index(_) => "INDEX_ERROR",
            Self::IndexInconsistency { .. } => "INDEX_INCONSISTENCY",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an index error.
    #[must_use]
    pub fn index<T: Into<String>>(message: T) -> Self {
        Self::Index(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for the "not found" outcome, which callers render
    /// differently from server failures.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for MemoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::StoreUnavailable(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for MemoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error body for the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `MemoError`.
    #[must_use]
    pub fn from_error(error: &MemoError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&MemoError> for ErrorResponse {
    fn from(error: &MemoError) -> Self {
        Self::from_error(error)
    }
}
