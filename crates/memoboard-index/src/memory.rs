//! In-process feed index.

use crate::{FeedAppend, FeedIndex, IndexResult};
use async_trait::async_trait;
use memoboard_core::{FeedKey, FeedOrder, MemoId};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use tracing::debug;

/// Feed index held in process memory.
///
/// Used when Redis is disabled and as the test double. A multi-feed append
/// happens under one write lock, so readers see all of it or none of it.
#[derive(Debug, Default)]
pub struct InMemoryFeedIndex {
    feeds: RwLock<HashMap<FeedKey, VecDeque<MemoId>>>,
}

impl InMemoryFeedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty feeds.
    #[must_use]
    pub fn feed_count(&self) -> usize {
        self.feeds.read().len()
    }
}

#[async_trait]
impl FeedIndex for InMemoryFeedIndex {
    async fn append_all(&self, entries: &[FeedAppend]) -> IndexResult<()> {
        let mut feeds = self.feeds.write();
        for entry in entries {
            let list = feeds.entry(entry.feed).or_default();
            match entry.feed.order() {
                FeedOrder::NewestFirst => list.push_front(entry.memo_id),
                FeedOrder::OldestFirst => list.push_back(entry.memo_id),
            }
        }
        debug!(entries = entries.len(), "Appended to in-memory feed index");
        Ok(())
    }

    async fn range_feed(&self, feed: FeedKey, window: Range<usize>) -> IndexResult<Vec<MemoId>> {
        let feeds = self.feeds.read();
        Ok(feeds.get(&feed).map_or_else(Vec::new, |list| {
            list.iter()
                .skip(window.start)
                .take(window.end.saturating_sub(window.start))
                .copied()
                .collect()
        }))
    }

    async fn feed_members(&self, feed: FeedKey) -> IndexResult<Vec<MemoId>> {
        let feeds = self.feeds.read();
        Ok(feeds
            .get(&feed)
            .map_or_else(Vec::new, |list| list.iter().copied().collect()))
    }

    async fn feed_length(&self, feed: FeedKey) -> IndexResult<u64> {
        let feeds = self.feeds.read();
        Ok(feeds.get(&feed).map_or(0, |list| list.len() as u64))
    }

    async fn clear(&self) -> IndexResult<u64> {
        let mut feeds = self.feeds.write();
        let removed = feeds.len() as u64;
        feeds.clear();
        Ok(removed)
    }

    async fn health_check(&self) -> IndexResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoboard_core::UserId;

    fn ids(raw: &[u64]) -> Vec<MemoId> {
        raw.iter().copied().map(MemoId::new).collect()
    }

    #[tokio::test]
    async fn test_public_feed_is_newest_first() {
        let index = InMemoryFeedIndex::new();
        for id in 1..=3 {
            index
                .append_to_feed(FeedKey::Public, MemoId::new(id))
                .await
                .unwrap();
        }

        assert_eq!(index.feed_members(FeedKey::Public).await.unwrap(), ids(&[3, 2, 1]));
    }

    #[tokio::test]
    async fn test_user_feeds_are_oldest_first() {
        let index = InMemoryFeedIndex::new();
        let user = FeedKey::User(UserId::new(1));
        let user_public = FeedKey::UserPublic(UserId::new(1));
        for id in 1..=3 {
            index
                .append_all(&[
                    FeedAppend::new(user, MemoId::new(id)),
                    FeedAppend::new(user_public, MemoId::new(id)),
                ])
                .await
                .unwrap();
        }

        assert_eq!(index.feed_members(user).await.unwrap(), ids(&[1, 2, 3]));
        assert_eq!(index.feed_members(user_public).await.unwrap(), ids(&[1, 2, 3]));
    }

    #[tokio::test]
    async fn test_range_windows() {
        let index = InMemoryFeedIndex::new();
        let feed = FeedKey::User(UserId::new(2));
        for id in 1..=5 {
            index.append_to_feed(feed, MemoId::new(id)).await.unwrap();
        }

        assert_eq!(index.range_feed(feed, 0..2).await.unwrap(), ids(&[1, 2]));
        assert_eq!(index.range_feed(feed, 4..6).await.unwrap(), ids(&[5]));
        assert!(index.range_feed(feed, 5..10).await.unwrap().is_empty());
        assert!(index
            .range_feed(FeedKey::Public, 0..10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_length_and_clear() {
        let index = InMemoryFeedIndex::new();
        index
            .append_all(&[
                FeedAppend::new(FeedKey::Public, MemoId::new(1)),
                FeedAppend::new(FeedKey::User(UserId::new(1)), MemoId::new(1)),
            ])
            .await
            .unwrap();

        assert_eq!(index.feed_length(FeedKey::Public).await.unwrap(), 1);
        assert_eq!(index.feed_count(), 2);
        assert_eq!(index.clear().await.unwrap(), 2);
        assert_eq!(index.feed_length(FeedKey::Public).await.unwrap(), 0);
    }
}
