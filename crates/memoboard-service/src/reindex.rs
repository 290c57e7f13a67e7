//! Rebuilding derived state from the relational store.

use crate::cache::CountCache;
use crate::dto::ReindexReport;
use crate::gate::IndexGate;
use crate::markup_service::MarkupService;
use crate::metrics;
use crate::names::NameDirectory;
use futures::stream::{self, StreamExt};
use memoboard_config::{FeedConfig, ReindexConfig, RenderConfig};
use memoboard_core::{FeedKey, Memo, MemoId, MemoResult, UserId};
use memoboard_index::{FeedAppend, FeedIndex};
use memoboard_repository::{MemoRepository, UserRepository};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reindex knobs taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReindexSettings {
    pub batch_size: usize,
    pub user_public_feed: bool,
    pub warm: bool,
    pub warm_concurrency: usize,
}

impl ReindexSettings {
    #[must_use]
    pub fn from_config(reindex: &ReindexConfig, feed: &FeedConfig, render: &RenderConfig) -> Self {
        Self {
            batch_size: reindex.batch_size.max(1),
            user_public_feed: feed.user_public_feed,
            warm: render.enabled && render.warm_on_reindex,
            warm_concurrency: render.warm_concurrency.max(1),
        }
    }
}

impl Default for ReindexSettings {
    fn default() -> Self {
        Self::from_config(
            &ReindexConfig::default(),
            &FeedConfig::default(),
            &RenderConfig::default(),
        )
    }
}

/// Rebuilds the feed index, the username table and (optionally) the render
/// cache from the relational store.
///
/// Every run starts by clearing the index, so running it twice yields the
/// same feeds. A run holds the [`IndexGate`] exclusively, which serializes
/// runs and keeps live writes out until the index is complete again.
pub struct Reindexer {
    users: Arc<dyn UserRepository>,
    memos: Arc<dyn MemoRepository>,
    index: Arc<dyn FeedIndex>,
    names: Arc<NameDirectory>,
    markup: Arc<MarkupService>,
    counts: Arc<CountCache>,
    gate: Arc<IndexGate>,
    settings: ReindexSettings,
}

impl Reindexer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        memos: Arc<dyn MemoRepository>,
        index: Arc<dyn FeedIndex>,
        names: Arc<NameDirectory>,
        markup: Arc<MarkupService>,
        counts: Arc<CountCache>,
        gate: Arc<IndexGate>,
        settings: ReindexSettings,
    ) -> Self {
        Self {
            users,
            memos,
            index,
            names,
            markup,
            counts,
            gate,
            settings,
        }
    }

    /// Runs a full rebuild, waiting for in-flight writes and for any run
    /// already in progress.
    pub async fn reindex_all(&self) -> MemoResult<ReindexReport> {
        let _rebuild = self.gate.rebuild().await;
        let started = Instant::now();
        info!(backend = self.index.backend(), "Reindex started");

        self.counts.clear();
        let users = self.rebuild_names().await?;

        let cleared = self.index.clear().await?;
        debug!(feeds = cleared, "Feed index cleared");

        let batch_size = self.settings.batch_size;
        let mut cursor = MemoId::ZERO;
        let mut report = ReindexReport {
            users,
            memos: 0,
            batches: 0,
            warmed: 0,
            elapsed: started.elapsed(),
        };

        loop {
            let batch = self.memos.find_memos_after(cursor, batch_size).await?;
            let fetched = batch.len();
            let Some(last) = batch.last() else {
                break;
            };
            cursor = last.id;

            self.index.append_all(&self.appends_for(&batch)).await?;
            report.memos += fetched as u64;
            report.batches += 1;
            debug!(batch = report.batches, memos = fetched, cursor = %cursor, "Reindexed batch");

            if self.settings.warm {
                report.warmed += self.warm(batch).await;
            }

            if fetched < batch_size {
                break;
            }
        }

        report.elapsed = started.elapsed();
        metrics::record_reindex(report.elapsed);
        info!(
            users = report.users,
            memos = report.memos,
            batches = report.batches,
            warmed = report.warmed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Reindex finished"
        );
        Ok(report)
    }

    /// Streams every user ascending by id into a fresh name table.
    async fn rebuild_names(&self) -> MemoResult<u64> {
        let batch_size = self.settings.batch_size;
        let mut table = HashMap::new();
        let mut cursor = UserId::new(0);

        loop {
            let batch = self.users.find_users_after(cursor, batch_size).await?;
            let fetched = batch.len();
            if let Some((last, _)) = batch.last() {
                cursor = *last;
            }
            table.extend(batch);
            if fetched < batch_size {
                break;
            }
        }

        let users = table.len() as u64;
        self.names.replace(table);
        Ok(users)
    }

    fn appends_for(&self, batch: &[Memo]) -> Vec<FeedAppend> {
        batch
            .iter()
            .flat_map(|memo| {
                FeedKey::targets_for(memo.user_id, memo.visibility, self.settings.user_public_feed)
                    .into_iter()
                    .map(move |feed| FeedAppend::new(feed, memo.id))
            })
            .collect()
    }

    /// Renders the batch into the cache on at most `warm_concurrency`
    /// blocking workers. Returns the number of bodies rendered.
    async fn warm(&self, batch: Vec<Memo>) -> u64 {
        let rendered = stream::iter(batch)
            .map(|memo| {
                let markup = Arc::clone(&self.markup);
                tokio::task::spawn_blocking(move || markup.warm(&memo.content))
            })
            .buffer_unordered(self.settings.warm_concurrency)
            .collect::<Vec<_>>()
            .await;

        rendered
            .into_iter()
            .filter(|result| match result {
                Ok(rendered) => *rendered,
                Err(e) => {
                    warn!(error = %e, "Render warm task failed");
                    false
                }
            })
            .count() as u64
    }
}

impl std::fmt::Debug for Reindexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reindexer")
            .field("index", &self.index.backend())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RenderCache;
    use crate::feed_service::FeedService;
    use crate::r#impl::{FeedServiceImpl, FeedSettings};
    use crate::render::MarkdownRenderer;
    use crate::testing::{FlakyFeedIndex, InMemoryMemoRepository, InMemoryUserRepository};
    use memoboard_core::Visibility;
    use std::time::Duration;

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        memos: Arc<InMemoryMemoRepository>,
        index: Arc<FlakyFeedIndex>,
        names: Arc<NameDirectory>,
        markup: Arc<MarkupService>,
        feeds: FeedServiceImpl,
        reindexer: Reindexer,
    }

    fn fixture(settings: ReindexSettings) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let memos = Arc::new(InMemoryMemoRepository::new());
        let index = Arc::new(FlakyFeedIndex::new());
        let names = Arc::new(NameDirectory::new(users.clone()));
        let counts = Arc::new(CountCache::new(Duration::from_secs(30)));
        let gate = Arc::new(IndexGate::new());
        let markup = Arc::new(MarkupService::new(
            Arc::new(MarkdownRenderer::new()),
            RenderCache::new(&RenderConfig::default()),
        ));
        let feeds = FeedServiceImpl::new(
            memos.clone(),
            index.clone(),
            names.clone(),
            markup.clone(),
            counts.clone(),
            gate.clone(),
            FeedSettings {
                warm_on_write: false,
                ..FeedSettings::default()
            },
        );
        let reindexer = Reindexer::new(
            users.clone(),
            memos.clone(),
            index.clone(),
            names.clone(),
            markup.clone(),
            counts,
            gate,
            settings,
        );
        Fixture {
            users,
            memos,
            index,
            names,
            markup,
            feeds,
            reindexer,
        }
    }

    async fn snapshot(f: &Fixture, owners: &[UserId]) -> Vec<Vec<MemoId>> {
        let mut feeds = vec![FeedKey::Public];
        for owner in owners {
            feeds.push(FeedKey::User(*owner));
            feeds.push(FeedKey::UserPublic(*owner));
        }
        let mut out = Vec::new();
        for feed in feeds {
            out.push(f.index.feed_members(feed).await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_empty_store() {
        let f = fixture(ReindexSettings::default());
        let report = f.reindexer.reindex_all().await.unwrap();
        assert_eq!(report.users, 0);
        assert_eq!(report.memos, 0);
        assert_eq!(report.batches, 0);
    }

    #[tokio::test]
    async fn test_rebuild_matches_live_writes_and_is_idempotent() {
        let f = fixture(ReindexSettings {
            batch_size: 2,
            ..ReindexSettings::default()
        });
        let alice = f.users.add_user("alice", "pw");
        let bob = f.users.add_user("bob", "pw");
        for (user, body, visibility) in [
            (alice, "a1", Visibility::Public),
            (bob, "b1", Visibility::Private),
            (alice, "a2", Visibility::Private),
            (bob, "b2", Visibility::Public),
            (alice, "a3", Visibility::Public),
        ] {
            f.feeds
                .create_memo(user, body.to_string(), visibility)
                .await
                .unwrap();
        }
        let live = snapshot(&f, &[alice, bob]).await;

        let first = f.reindexer.reindex_all().await.unwrap();
        assert_eq!(snapshot(&f, &[alice, bob]).await, live);
        assert_eq!(first.users, 2);
        assert_eq!(first.memos, 5);
        assert_eq!(first.batches, 3);

        f.reindexer.reindex_all().await.unwrap();
        assert_eq!(snapshot(&f, &[alice, bob]).await, live);
    }

    #[tokio::test]
    async fn test_repairs_missed_index_write() {
        let f = fixture(ReindexSettings::default());
        let alice = f.users.add_user("alice", "pw");
        f.index.fail_writes(true);
        f.feeds
            .create_memo(alice, "lost".to_string(), Visibility::Public)
            .await
            .unwrap();
        f.index.fail_writes(false);
        assert!(f.feeds.get_page(FeedKey::Public, 0, None).await.unwrap().is_empty());

        f.reindexer.reindex_all().await.unwrap();

        let page = f.feeds.get_page(FeedKey::Public, 0, None).await.unwrap();
        assert_eq!(page.content[0].content, "lost");
        assert_eq!(page.total_elements(), 1);
    }

    #[tokio::test]
    async fn test_loads_names_and_warms_cache() {
        let f = fixture(ReindexSettings::default());
        let alice = f.users.add_user("alice", "pw");
        f.feeds
            .create_memo(alice, "body".to_string(), Visibility::Public)
            .await
            .unwrap();

        let report = f.reindexer.reindex_all().await.unwrap();

        assert_eq!(f.names.snapshot().get(&alice).map(String::as_str), Some("alice"));
        assert_eq!(report.warmed, 1);
        assert_eq!(f.markup.cache().entry_count(), 1);
    }

    #[tokio::test]
    async fn test_warming_disabled() {
        let f = fixture(ReindexSettings {
            warm: false,
            ..ReindexSettings::default()
        });
        let alice = f.users.add_user("alice", "pw");
        f.feeds
            .create_memo(alice, "body".to_string(), Visibility::Public)
            .await
            .unwrap();

        let report = f.reindexer.reindex_all().await.unwrap();
        assert_eq!(report.warmed, 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_serialized() {
        let f = fixture(ReindexSettings::default());
        let alice = f.users.add_user("alice", "pw");
        for body in ["x", "y", "z"] {
            f.feeds
                .create_memo(alice, body.to_string(), Visibility::Public)
                .await
                .unwrap();
        }

        let (a, b) = tokio::join!(f.reindexer.reindex_all(), f.reindexer.reindex_all());
        assert_eq!(a.unwrap().memos, 3);
        assert_eq!(b.unwrap().memos, 3);
        assert_eq!(f.index.feed_members(FeedKey::Public).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_write_during_rebuild_is_indexed_once() {
        let f = fixture(ReindexSettings::default());
        let alice = f.users.add_user("alice", "pw");
        let one = f
            .feeds
            .create_memo(alice, "one".to_string(), Visibility::Public)
            .await
            .unwrap();

        f.memos.pause_next_scan();
        let write = async {
            f.memos.scan_paused().await;
            let (created, ()) = tokio::join!(
                f.feeds.create_memo(alice, "two".to_string(), Visibility::Public),
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    f.memos.resume_scan();
                }
            );
            created
        };
        let (report, two) = tokio::join!(f.reindexer.reindex_all(), write);
        let two = two.unwrap();
        assert_eq!(report.unwrap().memos, 1);

        assert_eq!(f.index.feed_members(FeedKey::Public).await.unwrap(), vec![two, one]);
        assert_eq!(
            f.index.feed_members(FeedKey::User(alice)).await.unwrap(),
            vec![one, two]
        );
        assert_eq!(
            f.index.feed_members(FeedKey::UserPublic(alice)).await.unwrap(),
            vec![one, two]
        );
    }

    #[tokio::test]
    async fn test_index_failure_is_reported() {
        let f = fixture(ReindexSettings::default());
        f.index.fail_writes(true);
        let err = f.reindexer.reindex_all().await.unwrap_err();
        assert_eq!(err.error_code(), "INDEX_ERROR");
    }
}
