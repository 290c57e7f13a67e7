//! Redis-backed feed index.

use crate::{FeedAppend, FeedIndex, FeedKeys, IndexError, IndexResult};
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use memoboard_config::RedisConfig;
use memoboard_core::{FeedKey, FeedOrder, MemoId};
use redis::AsyncCommands;
use std::ops::Range;
use tracing::{debug, info};

const SCAN_COUNT: usize = 1000;

/// Create a Redis connection pool and verify it with `PING`.
pub async fn create_pool(config: &RedisConfig) -> IndexResult<Pool> {
    info!("Creating Redis connection pool for the feed index...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| IndexError::Configuration(format!("Invalid Redis config: {e}")))?
        .max_size(config.pool_size as usize)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| IndexError::Configuration(format!("Failed to create pool: {e}")))?;

    let mut conn = pool.get().await?;
    redis::cmd("PING").query_async::<String>(&mut *conn).await?;

    info!("Redis connection pool created successfully");
    Ok(pool)
}

/// Feed index stored as Redis lists.
pub struct RedisFeedIndex {
    pool: Pool,
    keys: FeedKeys,
}

impl RedisFeedIndex {
    /// Create an index over an existing pool.
    #[must_use]
    pub const fn new(pool: Pool, keys: FeedKeys) -> Self {
        Self { pool, keys }
    }

    /// Connect using configuration.
    pub async fn connect(config: &RedisConfig) -> IndexResult<Self> {
        let pool = create_pool(config).await?;
        Ok(Self::new(pool, FeedKeys::new(config.key_prefix.clone())))
    }

    async fn conn(&self) -> IndexResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    async fn scan(&self, pattern: &str) -> IndexResult<Vec<String>> {
        let mut conn = self.conn().await?;
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut *conn)
                .await?;
            found.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(found)
    }
}

/// Converts a list position to the signed index `LRANGE` expects.
fn list_index(position: usize) -> isize {
    isize::try_from(position).unwrap_or(isize::MAX)
}

#[async_trait]
impl FeedIndex for RedisFeedIndex {
    async fn append_all(&self, entries: &[FeedAppend]) -> IndexResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for entry in entries {
            let key = self.keys.key(entry.feed);
            let id = entry.memo_id.into_inner();
            match entry.feed.order() {
                FeedOrder::NewestFirst => pipe.lpush(key, id).ignore(),
                FeedOrder::OldestFirst => pipe.rpush(key, id).ignore(),
            };
        }

        let mut conn = self.conn().await?;
        let _: () = pipe.query_async(&mut *conn).await?;

        debug!(entries = entries.len(), "Appended to feed index");
        Ok(())
    }

    async fn range_feed(&self, feed: FeedKey, window: Range<usize>) -> IndexResult<Vec<MemoId>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;
        let ids: Vec<u64> = conn
            .lrange(
                self.keys.key(feed),
                list_index(window.start),
                list_index(window.end - 1),
            )
            .await?;

        Ok(ids.into_iter().map(MemoId::new).collect())
    }

    async fn feed_members(&self, feed: FeedKey) -> IndexResult<Vec<MemoId>> {
        let mut conn = self.conn().await?;
        let ids: Vec<u64> = conn.lrange(self.keys.key(feed), 0, -1).await?;
        Ok(ids.into_iter().map(MemoId::new).collect())
    }

    async fn feed_length(&self, feed: FeedKey) -> IndexResult<u64> {
        let mut conn = self.conn().await?;
        let len: u64 = conn.llen(self.keys.key(feed)).await?;
        Ok(len)
    }

    async fn clear(&self) -> IndexResult<u64> {
        let mut removed = 0u64;

        for pattern in self.keys.patterns() {
            let keys = self.scan(&pattern).await?;
            if keys.is_empty() {
                continue;
            }

            let mut conn = self.conn().await?;
            for chunk in keys.chunks(SCAN_COUNT) {
                let deleted: u64 = conn.del(chunk).await?;
                removed += deleted;
            }
        }

        info!(removed, "Cleared feed index");
        Ok(removed)
    }

    async fn health_check(&self) -> IndexResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING").query_async::<String>(&mut *conn).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisFeedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisFeedIndex")
            .field("keys", &self.keys)
            .field("pool_size", &status.size)
            .field("pool_available", &status.available)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_index_saturates() {
        assert_eq!(list_index(0), 0);
        assert_eq!(list_index(99), 99);
        assert_eq!(list_index(usize::MAX), isize::MAX);
    }
}
