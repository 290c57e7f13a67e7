//! Database connection pool management.

use memoboard_config::DatabaseConfig;
use memoboard_core::{MemoError, MemoResult};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::MySql;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A connection checked out of the pool.
///
/// Dropping the guard returns the connection, on every exit path.
pub type PooledConnection = PoolConnection<MySql>;

/// Fixed-size pool of MySQL connections.
///
/// The pool opens `pool_size` connections up front and never grows past
/// that. Waiting for a free connection is bounded by the configured acquire
/// timeout.
pub struct DatabasePool {
    pool: MySqlPool,
    capacity: u32,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// Fails with `StoreUnavailable` when the store cannot be reached.
    pub async fn new(config: &DatabaseConfig) -> MemoResult<Self> {
        info!(
            pool_size = config.pool_size,
            "Connecting to MySQL database..."
        );

        let pool = MySqlPoolOptions::new()
            .min_connections(config.pool_size)
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .test_before_acquire(false)
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                MemoError::StoreUnavailable(format!("Failed to connect: {e}"))
            })?;

        info!("MySQL connection pool established");
        Ok(Self {
            pool,
            capacity: config.pool_size,
        })
    }

    /// Creates a new database pool from configuration.
    ///
    /// This is an alias for [`new`](Self::new).
    pub async fn connect(config: &DatabaseConfig) -> MemoResult<Self> {
        Self::new(config).await
    }

    /// Checks out a connection, waiting until one is free or the acquire
    /// timeout elapses.
    pub async fn acquire(&self) -> MemoResult<PooledConnection> {
        self.pool.acquire().await.map_err(|e| {
            warn!(
                size = self.pool.size(),
                idle = self.pool.num_idle(),
                "Failed to acquire database connection: {}",
                e
            );
            MemoError::from(e)
        })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub const fn inner(&self) -> &MySqlPool {
        &self.pool
    }

    /// Checks if the database connection is healthy.
    pub async fn health_check(&self) -> MemoResult<()> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(|e| MemoError::StoreUnavailable(format!("Health check failed: {e}")))?;
        debug!("Database health check passed");
        Ok(())
    }

    /// Runs database migrations.
    pub async fn run_migrations(&self) -> MemoResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MemoError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("capacity", &self.capacity)
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates a shared database pool.
pub async fn create_pool(config: &DatabaseConfig) -> MemoResult<Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    Ok(Arc::new(pool))
}
