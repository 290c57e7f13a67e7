//! Feed identities and their ordering discipline.

use crate::{MemoError, UserId, Visibility};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

const PUBLIC_KEY: &str = "public_memo_list";
const USER_KEY: &str = "user_memo_list";
const USER_PUBLIC_KEY: &str = "user_public_memo_list";

/// Order in which a feed stores its ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrder {
    /// New ids are prepended.
    NewestFirst,
    /// New ids are appended.
    OldestFirst,
}

/// A named, ordered collection of memo ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum FeedKey {
    /// Every public memo on the board.
    Public,
    /// Every memo of one user, private ones included.
    User(UserId),
    /// The public memos of one user.
    UserPublic(UserId),
}

impl FeedKey {
    #[must_use]
    pub const fn order(self) -> FeedOrder {
        match self {
            Self::Public => FeedOrder::NewestFirst,
            Self::User(_) | Self::UserPublic(_) => FeedOrder::OldestFirst,
        }
    }

    /// The feeds a newly accepted memo belongs to.
    ///
    /// The per-user feed always comes first; public memos additionally land in
    /// the global feed and, when enabled, in the owner's public-only feed.
    #[must_use]
    pub fn targets_for(owner: UserId, visibility: Visibility, with_user_public: bool) -> Vec<Self> {
        let mut targets = vec![Self::User(owner)];
        if visibility.is_public() {
            targets.push(Self::Public);
            if with_user_public {
                targets.push(Self::UserPublic(owner));
            }
        }
        targets
    }
}

impl Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str(PUBLIC_KEY),
            Self::User(id) => write!(f, "{USER_KEY}:{id}"),
            Self::UserPublic(id) => write!(f, "{USER_PUBLIC_KEY}:{id}"),
        }
    }
}

impl FromStr for FeedKey {
    type Err = MemoError;

    /// Accepts the short forms `public`, `user:<id>` and `user-public:<id>`
    /// as well as the stored key names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "public" || s == PUBLIC_KEY {
            return Ok(Self::Public);
        }

        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| MemoError::validation(format!("unknown feed: {s}")))?;
        let id: UserId = id
            .parse()
            .map_err(|_| MemoError::validation(format!("invalid user id in feed: {s}")))?;

        match kind {
            "user" | USER_KEY => Ok(Self::User(id)),
            "user-public" | USER_PUBLIC_KEY => Ok(Self::UserPublic(id)),
            _ => Err(MemoError::validation(format!("unknown feed: {s}"))),
        }
    }
}
