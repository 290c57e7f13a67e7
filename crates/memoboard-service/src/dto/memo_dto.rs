//! Memo-related DTOs.

use chrono::{DateTime, Utc};
use memoboard_core::{Memo, MemoId, UserId, Visibility};
use serde::{Deserialize, Serialize};

/// A memo hydrated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoView {
    pub id: MemoId,
    pub user_id: UserId,
    /// Author display name; empty when the author is unknown to the store.
    pub username: String,
    /// First line of the body.
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemoView {
    #[must_use]
    pub fn new(memo: Memo, username: impl Into<String>) -> Self {
        let title = memo.first_line().to_string();
        Self {
            id: memo.id,
            user_id: memo.user_id,
            username: username.into(),
            title,
            content: memo.content,
            visibility: memo.visibility,
            created_at: memo.created_at,
            updated_at: memo.updated_at,
        }
    }

    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.visibility.is_private()
    }
}

/// A single memo with its neighbours in the requester's visible ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoDetail {
    pub memo: MemoView,
    /// Rendered body.
    pub html: String,
    /// The memo shown before this one, if any.
    pub previous: Option<MemoId>,
    /// The memo shown after this one, if any.
    pub next: Option<MemoId>,
}
