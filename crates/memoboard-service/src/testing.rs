//! In-memory doubles for service tests.

use crate::auth_service::password_digest;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use memoboard_core::{
    FeedKey, Memo, MemoError, MemoId, MemoResult, NewMemo, User, UserId,
};
use memoboard_index::{FeedAppend, FeedIndex, InMemoryFeedIndex, IndexError, IndexResult};
use memoboard_repository::{MemoRepository, UserRepository};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    username_lookups: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user with the legacy salted digest and returns its id.
    pub fn add_user(&self, username: &str, password: &str) -> UserId {
        let mut users = self.users.lock();
        let id = UserId::new(users.len() as u64 + 1);
        let salt = format!("{username}-salt");
        users.push(User::new(
            id,
            username,
            password_digest(&salt, password),
            salt,
        ));
        id
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.lock().iter().find(|u| u.id == id).cloned()
    }

    /// Number of batched username queries served.
    pub fn username_lookups(&self) -> usize {
        self.username_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_user_by_id(&self, id: UserId) -> MemoResult<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_user_by_name(&self, username: &str) -> MemoResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_last_access(&self, id: UserId) -> MemoResult<()> {
        let mut users = self.users.lock();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| MemoError::not_found("User", id))?;
        user.touch(Utc::now());
        Ok(())
    }

    async fn find_usernames(&self, ids: &[UserId]) -> MemoResult<HashMap<UserId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.username_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| (u.id, u.username.clone()))
            .collect())
    }

    async fn find_users_after(
        &self,
        cursor: UserId,
        limit: usize,
    ) -> MemoResult<Vec<(UserId, String)>> {
        Ok(self
            .users
            .lock()
            .iter()
            .filter(|u| u.id > cursor)
            .take(limit)
            .map(|u| (u.id, u.username.clone()))
            .collect())
    }
}

/// In-memory memo repository with store-assigned, increasing ids.
#[derive(Default)]
pub struct InMemoryMemoRepository {
    memos: Mutex<Vec<Memo>>,
    batch_fetches: AtomicUsize,
    pause_scan: AtomicBool,
    scan_entered: Notify,
    scan_released: Notify,
}

impl InMemoryMemoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a row behind the index's back.
    pub fn delete_row(&self, id: MemoId) {
        self.memos.lock().retain(|m| m.id != id);
    }

    /// Number of `find_memos_by_ids` round trips.
    pub fn batch_fetches(&self) -> usize {
        self.batch_fetches.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.memos.lock().len()
    }

    /// Makes the next `find_memos_after` stop before reading until
    /// [`Self::resume_scan`] is called.
    pub fn pause_next_scan(&self) {
        self.pause_scan.store(true, Ordering::SeqCst);
    }

    /// Resolves once a paused scan is waiting.
    pub async fn scan_paused(&self) {
        self.scan_entered.notified().await;
    }

    pub fn resume_scan(&self) {
        self.scan_released.notify_one();
    }
}

#[async_trait]
impl MemoRepository for InMemoryMemoRepository {
    async fn insert_memo(&self, memo: &NewMemo) -> MemoResult<MemoId> {
        let mut memos = self.memos.lock();
        let id = MemoId::new(memos.last().map_or(1, |m| m.id.into_inner() + 1));
        let created_at = Utc::now() + Duration::milliseconds(id.into_inner() as i64);
        memos.push(Memo {
            id,
            user_id: memo.user_id,
            content: memo.content.clone(),
            visibility: memo.visibility,
            created_at,
            updated_at: created_at,
        });
        Ok(id)
    }

    async fn find_memo_by_id(&self, id: MemoId) -> MemoResult<Option<Memo>> {
        Ok(self
            .memos
            .lock()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn find_memos_by_ids(&self, ids: &[MemoId]) -> MemoResult<Vec<Memo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.batch_fetches.fetch_add(1, Ordering::SeqCst);
        // Reverse so callers cannot rely on row order.
        Ok(self
            .memos
            .lock()
            .iter()
            .rev()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn find_memos_by_user(
        &self,
        user_id: UserId,
        include_private: bool,
    ) -> MemoResult<Vec<Memo>> {
        Ok(self
            .memos
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id && (include_private || m.visibility.is_public()))
            .cloned()
            .collect())
    }

    async fn count_memos_by_user(&self, user_id: UserId, include_private: bool) -> MemoResult<u64> {
        Ok(self
            .memos
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id && (include_private || m.visibility.is_public()))
            .count() as u64)
    }

    async fn find_memos_after(&self, cursor: MemoId, limit: usize) -> MemoResult<Vec<Memo>> {
        if self.pause_scan.swap(false, Ordering::SeqCst) {
            self.scan_entered.notify_one();
            self.scan_released.notified().await;
        }
        Ok(self
            .memos
            .lock()
            .iter()
            .filter(|m| m.id > cursor)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// In-memory index whose writes or length reads can be made to fail.
#[derive(Default)]
pub struct FlakyFeedIndex {
    inner: InMemoryFeedIndex,
    fail_writes: AtomicBool,
    fail_feed: Mutex<Option<FeedKey>>,
    fail_lengths: AtomicBool,
    length_reads: AtomicUsize,
}

impl FlakyFeedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Rejects any batch that touches `feed`. The rest of the batch is not
    /// applied either.
    pub fn fail_feed(&self, feed: Option<FeedKey>) {
        *self.fail_feed.lock() = feed;
    }

    pub fn fail_lengths(&self, fail: bool) {
        self.fail_lengths.store(fail, Ordering::SeqCst);
    }

    pub fn length_reads(&self) -> usize {
        self.length_reads.load(Ordering::SeqCst)
    }

    fn unavailable() -> IndexError {
        IndexError::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl FeedIndex for FlakyFeedIndex {
    async fn append_all(&self, entries: &[FeedAppend]) -> IndexResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let failing = *self.fail_feed.lock();
        if entries.iter().any(|entry| Some(entry.feed) == failing) {
            return Err(Self::unavailable());
        }
        self.inner.append_all(entries).await
    }

    async fn range_feed(&self, feed: FeedKey, window: Range<usize>) -> IndexResult<Vec<MemoId>> {
        self.inner.range_feed(feed, window).await
    }

    async fn feed_members(&self, feed: FeedKey) -> IndexResult<Vec<MemoId>> {
        self.inner.feed_members(feed).await
    }

    async fn feed_length(&self, feed: FeedKey) -> IndexResult<u64> {
        self.length_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_lengths.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.feed_length(feed).await
    }

    async fn clear(&self) -> IndexResult<u64> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.clear().await
    }

    async fn health_check(&self) -> IndexResult<()> {
        self.inner.health_check().await
    }

    fn backend(&self) -> &'static str {
        "flaky"
    }
}
