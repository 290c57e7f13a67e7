//! Data Transfer Objects (DTOs).

mod memo_dto;
mod reindex_dto;

pub use memo_dto::*;
pub use reindex_dto::*;
