//! MySQL memo repository implementation.

use crate::{DatabasePool, MemoRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memoboard_core::{Memo, MemoId, MemoResult, NewMemo, UserId, Visibility};
use sqlx::{FromRow, MySql, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

const MEMO_COLUMNS: &str = "id, `user`, content, is_private, created_at, updated_at";

/// MySQL memo repository implementation.
#[derive(Clone)]
pub struct MySqlMemoRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlMemoRepository {
    /// Creates a new MySQL memo repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a memo.
#[derive(Debug, FromRow)]
struct MemoRow {
    id: u64,
    user: u64,
    content: String,
    is_private: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MemoRow> for Memo {
    fn from(row: MemoRow) -> Self {
        Self {
            id: MemoId::new(row.id),
            user_id: UserId::new(row.user),
            content: row.content,
            visibility: Visibility::from_private_flag(row.is_private),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl MemoRepository for MySqlMemoRepository {
    async fn insert_memo(&self, memo: &NewMemo) -> MemoResult<MemoId> {
        debug!("Inserting memo for user: {}", memo.user_id);

        let now = Utc::now();
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO memos (`user`, content, is_private, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(memo.user_id.into_inner())
        .bind(&memo.content)
        .bind(memo.visibility.is_private())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(MemoId::new(result.last_insert_id()))
    }

    async fn find_memo_by_id(&self, id: MemoId) -> MemoResult<Option<Memo>> {
        debug!("Finding memo by id: {}", id);

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, MemoRow>(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?"
        ))
        .bind(id.into_inner())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Memo::from))
    }

    async fn find_memos_by_ids(&self, ids: &[MemoId]) -> MemoResult<Vec<Memo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Fetching {} memos by id", ids.len());

        let mut builder =
            QueryBuilder::<MySql>::new(format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.into_inner());
        }
        separated.push_unseparated(")");

        let mut conn = self.pool.acquire().await?;
        let rows = builder
            .build_query_as::<MemoRow>()
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Memo::from).collect())
    }

    async fn find_memos_by_user(
        &self,
        user_id: UserId,
        include_private: bool,
    ) -> MemoResult<Vec<Memo>> {
        debug!(
            "Finding memos by user: {} (include_private: {})",
            user_id, include_private
        );

        let sql = if include_private {
            format!("SELECT {MEMO_COLUMNS} FROM memos WHERE `user` = ? ORDER BY created_at, id")
        } else {
            format!(
                "SELECT {MEMO_COLUMNS} FROM memos WHERE `user` = ? AND is_private = 0 ORDER BY created_at, id"
            )
        };

        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, MemoRow>(&sql)
            .bind(user_id.into_inner())
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Memo::from).collect())
    }

    async fn count_memos_by_user(&self, user_id: UserId, include_private: bool) -> MemoResult<u64> {
        debug!(
            "Counting memos by user: {} (include_private: {})",
            user_id, include_private
        );

        let sql = if include_private {
            "SELECT COUNT(*) FROM memos WHERE `user` = ?"
        } else {
            "SELECT COUNT(*) FROM memos WHERE `user` = ? AND is_private = 0"
        };

        let mut conn = self.pool.acquire().await?;
        let count: i64 = sqlx::query_scalar(sql)
            .bind(user_id.into_inner())
            .fetch_one(&mut *conn)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_memos_after(&self, cursor: MemoId, limit: usize) -> MemoResult<Vec<Memo>> {
        debug!("Streaming memos after {} (limit {})", cursor, limit);

        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, MemoRow>(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos WHERE id > ? ORDER BY id ASC LIMIT ?"
        ))
        .bind(cursor.into_inner())
        .bind(limit as u64)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Memo::from).collect())
    }
}

impl std::fmt::Debug for MySqlMemoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlMemoRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_private_flag() {
        let now = Utc::now();
        let memo = Memo::from(MemoRow {
            id: 10,
            user: 2,
            content: "secret".to_string(),
            is_private: true,
            created_at: now,
            updated_at: now,
        });

        assert_eq!(memo.id, MemoId::new(10));
        assert_eq!(memo.user_id, UserId::new(2));
        assert_eq!(memo.visibility, Visibility::Private);
    }
}
