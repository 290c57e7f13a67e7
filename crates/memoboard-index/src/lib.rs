//! # Memoboard Index
//!
//! The secondary index: one ordered list of memo ids per feed.
//!
//! Two backends implement [`FeedIndex`]:
//!
//! - [`RedisFeedIndex`]: Redis lists, multi-key writes wrapped in `MULTI`/`EXEC`.
//! - [`InMemoryFeedIndex`]: process-local lists for development and tests.
//!
//! Both are derived data; the relational store remains the source of truth
//! and a reindex rebuilds either one from scratch.

mod error;
mod index;
mod keys;
mod memory;
mod redis_index;

pub use error::*;
pub use index::*;
pub use keys::FeedKeys;
pub use memory::InMemoryFeedIndex;
pub use redis_index::{create_pool, RedisFeedIndex};
