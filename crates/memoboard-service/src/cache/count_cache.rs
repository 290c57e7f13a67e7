//! Short-lived feed length estimates.

use memoboard_core::FeedKey;
use moka::sync::Cache;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

const MAX_FEEDS: u64 = 100_000;

/// Cached feed lengths.
///
/// Estimates expire after the configured TTL. The most recent value per feed
/// is also kept without expiry so a page can still report a length when the
/// index cannot be asked.
pub struct CountCache {
    estimates: Cache<FeedKey, u64>,
    last_known: RwLock<HashMap<FeedKey, u64>>,
}

impl CountCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            estimates: Cache::builder()
                .name("feed-count")
                .max_capacity(MAX_FEEDS)
                .time_to_live(ttl)
                .build(),
            last_known: RwLock::new(HashMap::new()),
        }
    }

    /// A fresh estimate, if one is cached.
    #[must_use]
    pub fn get(&self, feed: FeedKey) -> Option<u64> {
        self.estimates.get(&feed)
    }

    pub fn put(&self, feed: FeedKey, count: u64) {
        self.estimates.insert(feed, count);
        self.last_known.write().insert(feed, count);
    }

    /// Adds `by` to a cached estimate. Feeds without a fresh estimate are
    /// left alone; the next read fetches the real length.
    pub fn bump(&self, feed: FeedKey, by: u64) {
        if let Some(current) = self.estimates.get(&feed) {
            self.put(feed, current.saturating_add(by));
        }
    }

    /// The latest value ever stored for `feed`, expired or not.
    #[must_use]
    pub fn last_known(&self, feed: FeedKey) -> Option<u64> {
        self.last_known.read().get(&feed).copied()
    }

    /// Forgets every estimate, including last known values.
    pub fn clear(&self) {
        self.estimates.invalidate_all();
        self.last_known.write().clear();
    }
}

impl std::fmt::Debug for CountCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountCache")
            .field("feeds", &self.last_known.read().len())
            .finish()
    }
}
