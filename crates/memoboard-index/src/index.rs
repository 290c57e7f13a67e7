//! The feed index contract.

use crate::IndexResult;
use async_trait::async_trait;
use memoboard_core::{FeedKey, MemoId};
use std::ops::Range;

/// One id to add to one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedAppend {
    pub feed: FeedKey,
    pub memo_id: MemoId,
}

impl FeedAppend {
    #[must_use]
    pub const fn new(feed: FeedKey, memo_id: MemoId) -> Self {
        Self { feed, memo_id }
    }
}

/// Ordered lists of memo ids, one per feed.
///
/// Each append honours the feed's [`FeedOrder`](memoboard_core::FeedOrder):
/// newest-first feeds grow at the head, oldest-first feeds at the tail.
#[async_trait]
pub trait FeedIndex: Send + Sync {
    /// Adds one id to one feed.
    async fn append_to_feed(&self, feed: FeedKey, memo_id: MemoId) -> IndexResult<()> {
        self.append_all(&[FeedAppend::new(feed, memo_id)]).await
    }

    /// Applies every append or none of them.
    async fn append_all(&self, entries: &[FeedAppend]) -> IndexResult<()>;

    /// Ids at positions `window` in stored order. A window past the end is
    /// empty, not an error.
    async fn range_feed(&self, feed: FeedKey, window: Range<usize>) -> IndexResult<Vec<MemoId>>;

    /// The complete stored sequence.
    async fn feed_members(&self, feed: FeedKey) -> IndexResult<Vec<MemoId>>;

    /// Number of ids in the feed; zero for a feed never written.
    async fn feed_length(&self, feed: FeedKey) -> IndexResult<u64>;

    /// Removes every feed. Returns the number of feeds removed.
    async fn clear(&self) -> IndexResult<u64>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> IndexResult<()>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
