//! Username lookup table.

use memoboard_core::{MemoResult, UserId};
use memoboard_repository::UserRepository;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Process-wide `UserId -> username` table.
///
/// Rebuilt wholesale by the reindexer: the new table is built off to the
/// side and swapped in, so readers see either the old or the new table,
/// never a partial one. Names missing from the table are fetched in one
/// batch and remembered.
pub struct NameDirectory {
    users: Arc<dyn UserRepository>,
    table: RwLock<Arc<HashMap<UserId, String>>>,
}

impl NameDirectory {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            table: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Installs a freshly built table.
    pub fn replace(&self, table: HashMap<UserId, String>) {
        let len = table.len();
        *self.table.write() = Arc::new(table);
        debug!(users = len, "Username table replaced");
    }

    /// The current table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HashMap<UserId, String>> {
        Arc::clone(&self.table.read())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Resolves names for `ids`, fetching those not yet known in one batch.
    /// Ids unknown to the store are absent from the result.
    pub async fn resolve(&self, ids: &[UserId]) -> MemoResult<HashMap<UserId, String>> {
        let table = self.snapshot();
        let mut resolved = HashMap::with_capacity(ids.len());
        let mut missing = Vec::new();

        for id in ids {
            match table.get(id) {
                Some(name) => {
                    resolved.insert(*id, name.clone());
                }
                None if !missing.contains(id) => missing.push(*id),
                None => {}
            }
        }

        if missing.is_empty() {
            return Ok(resolved);
        }

        debug!(missing = missing.len(), "Fetching usernames not in table");
        let fetched = self.users.find_usernames(&missing).await?;
        if !fetched.is_empty() {
            self.remember(&fetched);
        }
        resolved.extend(fetched);

        Ok(resolved)
    }

    fn remember(&self, names: &HashMap<UserId, String>) {
        let mut guard = self.table.write();
        let mut table = HashMap::clone(&guard);
        table.extend(names.iter().map(|(id, name)| (*id, name.clone())));
        *guard = Arc::new(table);
    }
}

impl std::fmt::Debug for NameDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameDirectory")
            .field("users", &self.len())
            .finish_non_exhaustive()
    }
}
