//! Repository trait definitions.

use async_trait::async_trait;
use memoboard_core::{Memo, MemoId, MemoResult, NewMemo, User, UserId};
use std::collections::HashMap;

/// User repository trait.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by ID.
    async fn find_user_by_id(&self, id: UserId) -> MemoResult<Option<User>>;

    /// Finds a user by username.
    async fn find_user_by_name(&self, username: &str) -> MemoResult<Option<User>>;

    /// Sets `last_access` to now.
    async fn update_last_access(&self, id: UserId) -> MemoResult<()>;

    /// Resolves display names for a batch of ids. Unknown ids are absent
    /// from the result.
    async fn find_usernames(&self, ids: &[UserId]) -> MemoResult<HashMap<UserId, String>>;

    /// Keyset page of `(id, username)` with `id > cursor`, ascending.
    async fn find_users_after(
        &self,
        cursor: UserId,
        limit: usize,
    ) -> MemoResult<Vec<(UserId, String)>>;
}

/// Memo repository trait.
#[async_trait]
pub trait MemoRepository: Send + Sync {
    /// Stores a memo and returns its store-assigned id.
    async fn insert_memo(&self, memo: &NewMemo) -> MemoResult<MemoId>;

    /// Finds a memo by ID.
    async fn find_memo_by_id(&self, id: MemoId) -> MemoResult<Option<Memo>>;

    /// Fetches the rows matching `ids`, in no particular order.
    async fn find_memos_by_ids(&self, ids: &[MemoId]) -> MemoResult<Vec<Memo>>;

    /// A user's memos ordered by creation, then id.
    async fn find_memos_by_user(
        &self,
        user_id: UserId,
        include_private: bool,
    ) -> MemoResult<Vec<Memo>>;

    /// Number of memos a user has, optionally counting private ones.
    async fn count_memos_by_user(&self, user_id: UserId, include_private: bool) -> MemoResult<u64>;

    /// Keyset page of memos with `id > cursor`, ascending.
    async fn find_memos_after(&self, cursor: MemoId, limit: usize) -> MemoResult<Vec<Memo>>;
}
