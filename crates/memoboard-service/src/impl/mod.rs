//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `feed_service.rs`).

pub mod feed_service_impl;

pub use feed_service_impl::{FeedServiceImpl, FeedSettings};
