//! Application wiring.

use memoboard_config::AppConfig;
use memoboard_core::{MemoError, MemoResult};
use memoboard_index::{FeedIndex, InMemoryFeedIndex, RedisFeedIndex};
use memoboard_repository::{
    create_pool, DatabasePool, MemoRepository, MySqlMemoRepository, MySqlUserRepository,
    UserRepository,
};
use memoboard_service::{
    register_metrics, AuthService, AuthServiceImpl, CountCache, FeedService, FeedServiceImpl,
    FeedSettings, IndexGate, MarkdownRenderer, MarkupService, NameDirectory, ReindexReport,
    ReindexSettings, Reindexer, RenderCache,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Services built once at startup and shared through `Arc`.
#[derive(Clone)]
pub struct Services {
    pub feeds: Arc<dyn FeedService>,
    pub auth: Arc<dyn AuthService>,
    pub reindexer: Arc<Reindexer>,
    pub markup: Arc<MarkupService>,
    pub names: Arc<NameDirectory>,
    pub counts: Arc<CountCache>,
}

impl Services {
    /// Builds every service over the given store and index.
    pub fn wire(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        memos: Arc<dyn MemoRepository>,
        index: Arc<dyn FeedIndex>,
    ) -> Self {
        let names = Arc::new(NameDirectory::new(Arc::clone(&users)));
        let counts = Arc::new(CountCache::new(config.feed.count_ttl()));
        let markup = Arc::new(MarkupService::new(
            Arc::new(MarkdownRenderer::new()),
            RenderCache::new(&config.render),
        ));
        let gate = Arc::new(IndexGate::new());

        let feeds: Arc<dyn FeedService> = Arc::new(FeedServiceImpl::new(
            Arc::clone(&memos),
            Arc::clone(&index),
            Arc::clone(&names),
            Arc::clone(&markup),
            Arc::clone(&counts),
            Arc::clone(&gate),
            FeedSettings::from_config(&config.feed, &config.render),
        ));

        let reindexer = Arc::new(Reindexer::new(
            Arc::clone(&users),
            memos,
            index,
            Arc::clone(&names),
            Arc::clone(&markup),
            Arc::clone(&counts),
            gate,
            ReindexSettings::from_config(&config.reindex, &config.feed, &config.render),
        ));

        let auth: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(users));

        Self {
            feeds,
            auth,
            reindexer,
            markup,
            names,
            counts,
        }
    }
}

/// Health of one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub backend: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn from_result(backend: impl Into<String>, result: MemoResult<()>) -> Self {
        Self {
            backend: backend.into(),
            healthy: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        }
    }
}

/// Health of the storage core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub database: ComponentHealth,
    pub index: ComponentHealth,
}

/// The running storage core.
pub struct App {
    config: AppConfig,
    pool: Arc<DatabasePool>,
    index: Arc<dyn FeedIndex>,
    services: Services,
}

impl App {
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// Rebuilds derived state if configured to do so at startup.
    pub async fn startup_reindex(&self) -> MemoResult<Option<ReindexReport>> {
        if !self.config.reindex.on_startup {
            return Ok(None);
        }
        info!("Running startup reindex");
        self.services.reindexer.reindex_all().await.map(Some)
    }

    pub async fn health(&self) -> HealthReport {
        let database = ComponentHealth::from_result("mysql", self.pool.health_check().await);
        let index = ComponentHealth::from_result(
            self.index.backend(),
            self.index.health_check().await.map_err(MemoError::from),
        );
        HealthReport {
            healthy: database.healthy && index.healthy,
            database,
            index,
        }
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("pool", &self.pool)
            .field("index", &self.index.backend())
            .finish_non_exhaustive()
    }
}

/// Application builder.
pub struct AppBuilder {
    config: Option<AppConfig>,
}

impl AppBuilder {
    /// Creates a new application builder.
    #[must_use]
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Connects the backends and builds the services.
    ///
    /// An unreachable database is fatal. When Redis is disabled the feed
    /// index lives in process memory and must be rebuilt by a reindex.
    pub async fn build(self) -> MemoResult<App> {
        let config = self.config.unwrap_or_default();

        let pool = create_pool(&config.database).await?;
        if config.database.run_migrations {
            pool.run_migrations().await?;
        }

        let index: Arc<dyn FeedIndex> = if config.redis.enabled {
            Arc::new(RedisFeedIndex::connect(&config.redis).await?)
        } else {
            warn!("Redis disabled; feed index held in process memory");
            Arc::new(InMemoryFeedIndex::new())
        };

        register_metrics();

        let users: Arc<dyn UserRepository> = Arc::new(MySqlUserRepository::new(Arc::clone(&pool)));
        let memos: Arc<dyn MemoRepository> = Arc::new(MySqlMemoRepository::new(Arc::clone(&pool)));
        let services = Services::wire(&config, users, memos, Arc::clone(&index));

        info!(index = index.backend(), "Memoboard storage core ready");
        Ok(App {
            config,
            pool,
            index,
            services,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
