//! MySQL user repository implementation.

use crate::{DatabasePool, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memoboard_core::{MemoResult, User, UserId};
use sqlx::{FromRow, MySql, QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// MySQL user repository implementation.
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlUserRepository {
    /// Creates a new MySQL user repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: u64,
    username: String,
    password: String,
    salt: String,
    last_access: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            password_hash: row.password,
            salt: row.salt,
            last_access: row.last_access,
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_user_by_id(&self, id: UserId) -> MemoResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, salt, last_access FROM users WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_name(&self, username: &str) -> MemoResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, salt, last_access FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_last_access(&self, id: UserId) -> MemoResult<()> {
        debug!("Updating last access for user: {}", id);

        let mut conn = self.pool.acquire().await?;
        sqlx::query("UPDATE users SET last_access = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.into_inner())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    async fn find_usernames(&self, ids: &[UserId]) -> MemoResult<HashMap<UserId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        debug!("Resolving {} usernames", ids.len());

        let mut builder = QueryBuilder::<MySql>::new("SELECT id, username FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.into_inner());
        }
        separated.push_unseparated(")");

        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(u64, String)> = builder.build_query_as().fetch_all(&mut *conn).await?;

        Ok(rows
            .into_iter()
            .map(|(id, username)| (UserId::new(id), username))
            .collect())
    }

    async fn find_users_after(
        &self,
        cursor: UserId,
        limit: usize,
    ) -> MemoResult<Vec<(UserId, String)>> {
        debug!("Streaming users after {} (limit {})", cursor, limit);

        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(u64, String)> =
            sqlx::query_as("SELECT id, username FROM users WHERE id > ? ORDER BY id ASC LIMIT ?")
                .bind(cursor.into_inner())
                .bind(limit as u64)
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, username)| (UserId::new(id), username))
            .collect())
    }
}

impl std::fmt::Debug for MySqlUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlUserRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_credentials() {
        let user = User::from(UserRow {
            id: 4,
            username: "alice".to_string(),
            password: "abc123".to_string(),
            salt: "s".to_string(),
            last_access: None,
        });

        assert_eq!(user.id, UserId::new(4));
        assert_eq!(user.password_hash, "abc123");
        assert_eq!(user.salt, "s");
        assert!(user.last_access.is_none());
    }
}
