//! Feed service implementation.

use crate::cache::CountCache;
use crate::dto::{MemoDetail, MemoView};
use crate::feed_service::FeedService;
use crate::gate::IndexGate;
use crate::markup_service::MarkupService;
use crate::metrics;
use crate::names::NameDirectory;
use async_trait::async_trait;
use memoboard_config::{FeedConfig, RenderConfig};
use memoboard_core::{
    FeedKey, Memo, MemoError, MemoId, MemoResult, NewMemo, Page, PageRequest, UserId,
    ValidateExt, Visibility,
};
use memoboard_index::{FeedAppend, FeedIndex};
use memoboard_repository::MemoRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Feed assembly knobs taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_size: usize,
    pub user_public_feed: bool,
    pub warm_on_write: bool,
}

impl FeedSettings {
    #[must_use]
    pub fn from_config(feed: &FeedConfig, render: &RenderConfig) -> Self {
        Self {
            page_size: feed.page_size.clamp(1, PageRequest::MAX_SIZE),
            user_public_feed: feed.user_public_feed,
            warm_on_write: render.enabled && render.warm_on_write,
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default(), &RenderConfig::default())
    }
}

/// Feed service over a relational store and a feed index.
pub struct FeedServiceImpl {
    memos: Arc<dyn MemoRepository>,
    index: Arc<dyn FeedIndex>,
    names: Arc<NameDirectory>,
    markup: Arc<MarkupService>,
    counts: Arc<CountCache>,
    gate: Arc<IndexGate>,
    settings: FeedSettings,
}

impl FeedServiceImpl {
    /// Creates a new feed service.
    pub fn new(
        memos: Arc<dyn MemoRepository>,
        index: Arc<dyn FeedIndex>,
        names: Arc<NameDirectory>,
        markup: Arc<MarkupService>,
        counts: Arc<CountCache>,
        gate: Arc<IndexGate>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            memos,
            index,
            names,
            markup,
            counts,
            gate,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> FeedSettings {
        self.settings
    }

    /// The feed actually read for `requested`. Someone other than the owner
    /// asking for a per-user feed gets the owner's public-only feed when it
    /// is maintained; otherwise rows are filtered after fetching.
    fn readable_feed(&self, requested: FeedKey, requester: Option<UserId>) -> FeedKey {
        match requested {
            FeedKey::User(owner) if requester != Some(owner) && self.settings.user_public_feed => {
                FeedKey::UserPublic(owner)
            }
            FeedKey::UserPublic(owner) if !self.settings.user_public_feed => FeedKey::User(owner),
            other => other,
        }
    }

    /// The feed whose length is reported for a page read from `source`.
    /// A filtered read of someone else's full feed reports the owner's public
    /// count so private memos are not revealed through the total.
    fn counted_feed(source: FeedKey, requester: Option<UserId>) -> FeedKey {
        match source {
            FeedKey::User(owner) if requester != Some(owner) => FeedKey::UserPublic(owner),
            other => other,
        }
    }

    /// Fetches rows for `ids` in one round trip and returns them in `ids`
    /// order. Ids with no row are dropped.
    async fn fetch_in_order(&self, ids: &[MemoId]) -> MemoResult<Vec<Memo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows: HashMap<MemoId, Memo> = self
            .memos
            .find_memos_by_ids(ids)
            .await?
            .into_iter()
            .map(|memo| (memo.id, memo))
            .collect();

        let ordered: Vec<Memo> = ids.iter().filter_map(|id| rows.remove(id)).collect();
        if ordered.len() < ids.len() {
            debug!(
                requested = ids.len(),
                found = ordered.len(),
                "Dropping index entries with no stored memo"
            );
        }
        Ok(ordered)
    }

    async fn hydrate(&self, memos: Vec<Memo>) -> MemoResult<Vec<MemoView>> {
        let mut authors: Vec<UserId> = memos.iter().map(|m| m.user_id).collect();
        authors.sort_unstable();
        authors.dedup();

        let names = self.names.resolve(&authors).await?;
        Ok(memos
            .into_iter()
            .map(|memo| {
                let username = names.get(&memo.user_id).cloned().unwrap_or_default();
                MemoView::new(memo, username)
            })
            .collect())
    }

    /// Current length of `feed`. Without a maintained public-only feed the
    /// owner's public count comes from the store.
    async fn fresh_length(&self, feed: FeedKey) -> MemoResult<u64> {
        match feed {
            FeedKey::UserPublic(owner) if !self.settings.user_public_feed => {
                self.memos.count_memos_by_user(owner, false).await
            }
            other => Ok(self.index.feed_length(other).await?),
        }
    }

    /// Length of `feed` for page metadata. A failed refresh falls back to
    /// the last known length, then to `floor`.
    async fn estimate_length(&self, feed: FeedKey, floor: u64) -> u64 {
        if let Some(count) = self.counts.get(feed) {
            return count;
        }

        match self.fresh_length(feed).await {
            Ok(count) => {
                self.counts.put(feed, count);
                count
            }
            Err(e) => {
                metrics::record_count_fallback();
                let fallback = self.counts.last_known(feed).unwrap_or(floor).max(floor);
                warn!(feed = %feed, error = %e, fallback, "Feed length refresh failed");
                fallback
            }
        }
    }

    /// Ids of the owner's memos in the order `requester` sees them.
    async fn visible_ordering(&self, owner: UserId, requester: Option<UserId>) -> MemoResult<Vec<MemoId>> {
        if requester == Some(owner) {
            return Ok(self.index.feed_members(FeedKey::User(owner)).await?);
        }
        if self.settings.user_public_feed {
            return Ok(self.index.feed_members(FeedKey::UserPublic(owner)).await?);
        }
        Ok(self
            .memos
            .find_memos_by_user(owner, false)
            .await?
            .into_iter()
            .map(|memo| memo.id)
            .collect())
    }
}

/// The ids immediately before and after `id` in `ordering`.
fn neighbours(ordering: &[MemoId], id: MemoId) -> (Option<MemoId>, Option<MemoId>) {
    match ordering.iter().position(|candidate| *candidate == id) {
        Some(pos) => (
            pos.checked_sub(1).map(|prev| ordering[prev]),
            ordering.get(pos + 1).copied(),
        ),
        None => (None, None),
    }
}

#[async_trait]
impl FeedService for FeedServiceImpl {
    async fn get_page(
        &self,
        feed: FeedKey,
        page: usize,
        requester: Option<UserId>,
    ) -> MemoResult<Page<MemoView>> {
        let source = self.readable_feed(feed, requester);
        let request = PageRequest::new(page, self.settings.page_size);
        debug!(feed = %source, page, "Assembling feed page");

        let ids = self.index.range_feed(source, request.window()).await?;
        let mut memos = self.fetch_in_order(&ids).await?;
        memos.retain(|memo| memo.is_visible_to(requester));

        let counted = Self::counted_feed(source, requester);
        let seen = if counted == source { ids.len() } else { memos.len() };
        let floor = (request.offset() as u64).saturating_add(seen as u64);

        let views = self.hydrate(memos).await?;
        let total = self.estimate_length(counted, floor).await;

        Ok(Page::new(views, request.page, request.size, total))
    }

    async fn create_memo(
        &self,
        user_id: UserId,
        body: String,
        visibility: Visibility,
    ) -> MemoResult<MemoId> {
        debug!("Creating memo for user: {}", user_id);

        let new_memo = NewMemo::new(user_id, body, visibility);
        new_memo.validate_request()?;

        let targets = FeedKey::targets_for(user_id, visibility, self.settings.user_public_feed);

        // A rebuild must not see the row and the append separately.
        let live = self.gate.live_write().await;
        let memo_id = self.memos.insert_memo(&new_memo).await?;
        let entries: Vec<FeedAppend> = targets
            .iter()
            .map(|feed| FeedAppend::new(*feed, memo_id))
            .collect();
        let appended = self.index.append_all(&entries).await;
        drop(live);

        if visibility.is_public() && !self.settings.user_public_feed {
            self.counts.bump(FeedKey::UserPublic(user_id), 1);
        }

        match appended {
            Ok(()) => {
                for feed in &targets {
                    self.counts.bump(*feed, 1);
                }
            }
            Err(e) => {
                let err = MemoError::IndexInconsistency {
                    memo_id,
                    message: e.to_string(),
                };
                metrics::record_index_write_failure();
                error!(
                    code = err.error_code(),
                    memo_id = %memo_id,
                    error = %err,
                    "Memo stored but feed index not updated; a reindex will repair it"
                );
            }
        }

        if self.settings.warm_on_write {
            self.markup.warm(&new_memo.content);
        }

        info!("Memo created: {} (user {}, {})", memo_id, user_id, visibility);
        Ok(memo_id)
    }

    async fn get_memo_detail(
        &self,
        memo_id: MemoId,
        requester: Option<UserId>,
    ) -> MemoResult<MemoDetail> {
        debug!("Getting memo: {}", memo_id);

        let memo = self
            .memos
            .find_memo_by_id(memo_id)
            .await?
            .filter(|memo| memo.is_visible_to(requester))
            .ok_or_else(|| MemoError::not_found("Memo", memo_id))?;

        let owner = memo.user_id;
        let ordering = self.visible_ordering(owner, requester).await?;
        let (previous, next) = neighbours(&ordering, memo_id);

        let html = self.markup.render_markup(&memo.content).to_string();
        let mut views = self.hydrate(vec![memo]).await?;
        let memo = views
            .pop()
            .ok_or_else(|| MemoError::internal("hydration dropped a memo"))?;

        Ok(MemoDetail {
            memo,
            html,
            previous,
            next,
        })
    }

    fn render_markup(&self, body: &str) -> Arc<str> {
        self.markup.render_markup(body)
    }
}

impl std::fmt::Debug for FeedServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedServiceImpl")
            .field("index", &self.index.backend())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
