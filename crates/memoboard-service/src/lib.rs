//! # Memoboard Service
//!
//! Feed assembly on top of the relational store and the feed index, plus
//! the caches and background work that keep reads cheap:
//!
//! - [`FeedService`]: paged feeds, memo creation, memo detail.
//! - [`AuthService`]: legacy salted-digest sign-in.
//! - [`Reindexer`]: rebuilds every piece of derived state from the store.
//! - [`IndexGate`]: keeps live writes out of a rebuild in progress.
//! - [`MarkupService`], [`RenderCache`], [`CountCache`], [`NameDirectory`]:
//!   shared in-process state, all safe to drop at any time.

pub mod auth_service;
pub mod cache;
pub mod dto;
pub mod feed_service;
pub mod gate;
pub mod r#impl;
pub mod markup_service;
pub mod metrics;
pub mod names;
pub mod reindex;
pub mod render;

#[cfg(test)]
mod testing;

pub use auth_service::*;
pub use cache::*;
pub use dto::*;
pub use feed_service::*;
pub use gate::IndexGate;
pub use r#impl::{FeedServiceImpl, FeedSettings};
pub use markup_service::MarkupService;
pub use metrics::register_metrics;
pub use names::NameDirectory;
pub use reindex::{ReindexSettings, Reindexer};
pub use render::{fingerprint, MarkdownRenderer, MarkupRenderer};
