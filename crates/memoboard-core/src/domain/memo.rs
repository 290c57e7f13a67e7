//! Memo entity and its write-side request.

use crate::validation::rules;
use crate::{MemoId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use validator::Validate;

/// Upper bound on a memo body, in characters (fits a MySQL `TEXT` column).
pub const MAX_CONTENT_LENGTH: u64 = 16_000;

/// Who may read a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    /// Maps the stored `is_private` flag.
    #[must_use]
    pub const fn from_private_flag(is_private: bool) -> Self {
        if is_private {
            Self::Private
        } else {
            Self::Public
        }
    }

    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// A stored memo.
///
/// The author's display name is not part of the row; it is attached at read
/// time by the feed assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: MemoId,
    pub user_id: UserId,
    pub content: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memo {
    /// Whether `requester` may see this memo.
    #[must_use]
    pub fn is_visible_to(&self, requester: Option<UserId>) -> bool {
        self.visibility.is_public() || requester == Some(self.user_id)
    }

    /// First line of the body, used as a title in list views.
    #[must_use]
    pub fn first_line(&self) -> &str {
        self.content.lines().next().unwrap_or_default()
    }
}

/// A memo accepted from the request layer, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewMemo {
    pub user_id: UserId,

    #[validate(
        length(max = MAX_CONTENT_LENGTH, message = "memo body is too long"),
        custom(function = rules::not_blank, message = "memo body must not be blank")
    )]
    pub content: String,

    pub visibility: Visibility,
}

impl NewMemo {
    #[must_use]
    pub fn new(user_id: UserId, content: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            user_id,
            content: content.into(),
            visibility,
        }
    }
}
