//! MySQL repository implementations.

mod memo_repository;
mod user_repository;

pub use memo_repository::*;
pub use user_repository::*;
