//! Coordination between live index writes and full rebuilds.

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared by the feed service and the reindexer.
///
/// A live write holds the shared side from its insert until its index
/// append completes. A rebuild holds the exclusive side from clearing the
/// index until the last stored memo is appended, so every memo reaches each
/// feed exactly once.
#[derive(Debug, Default)]
pub struct IndexGate {
    lock: RwLock<()>,
}

impl IndexGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entered by `create_memo`. Many writers may hold it at once.
    pub async fn live_write(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().await
    }

    /// Entered by a rebuild. Waits for in-flight writes and for any other
    /// rebuild to finish.
    pub async fn rebuild(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().await
    }
}
