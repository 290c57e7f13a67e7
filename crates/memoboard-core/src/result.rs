//! Result type aliases for Memoboard.

use crate::MemoError;

/// A specialized `Result` type for Memoboard operations.
pub type MemoResult<T> = Result<T, MemoError>;
