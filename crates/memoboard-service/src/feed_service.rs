//! Feed service trait definition.

use crate::dto::{MemoDetail, MemoView};
use async_trait::async_trait;
use memoboard_core::{FeedKey, MemoId, MemoResult, Page, UserId, Visibility};
use std::sync::Arc;

/// Feed service trait.
///
/// Reads go through the feed index for ordering and through the relational
/// store for content; writes go to the store first and the index second.
#[async_trait]
pub trait FeedService: Send + Sync {
    /// Returns page `page` (0-based) of `feed` as seen by `requester`.
    async fn get_page(
        &self,
        feed: FeedKey,
        page: usize,
        requester: Option<UserId>,
    ) -> MemoResult<Page<MemoView>>;

    /// Stores a memo and adds it to every feed it belongs to.
    ///
    /// Succeeds once the row is stored, even if the index update fails.
    async fn create_memo(
        &self,
        user_id: UserId,
        body: String,
        visibility: Visibility,
    ) -> MemoResult<MemoId>;

    /// Returns one memo with its rendered body and neighbours.
    async fn get_memo_detail(
        &self,
        memo_id: MemoId,
        requester: Option<UserId>,
    ) -> MemoResult<MemoDetail>;

    /// Renders a memo body to markup.
    fn render_markup(&self, body: &str) -> Arc<str>;
}
