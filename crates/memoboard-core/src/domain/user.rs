//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// Users are created out of band; the storage core only reads them and
/// refreshes `last_access` after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Display name, unique per user.
    pub username: String,

    /// Hex SHA-256 digest of `salt + password` (never serialized).
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Per-user salt (never serialized).
    #[serde(skip_serializing, default)]
    pub salt: String,

    /// Last successful authentication.
    pub last_access: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a user with no recorded access.
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>, password_hash: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            salt: salt.into(),
            last_access: None,
        }
    }

    /// Records a successful authentication.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_access = Some(at);
    }
}
