//! Fingerprint-keyed cache of rendered markup.

use memoboard_config::RenderConfig;
use moka::sync::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedMarkup {
    markup: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
struct MarkupExpiry;

impl Expiry<String, CachedMarkup> for MarkupExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedMarkup,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedMarkup,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Rendered markup keyed by body fingerprint, with per-entry TTL and a
/// bounded entry count.
pub struct RenderCache {
    cache: Option<Cache<String, CachedMarkup>>,
    default_ttl: Duration,
}

impl RenderCache {
    /// Creates a cache from configuration. A disabled configuration yields a
    /// cache that stores nothing.
    #[must_use]
    pub fn new(config: &RenderConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        let cache = Cache::builder()
            .name("render")
            .max_capacity(config.max_entries)
            .expire_after(MarkupExpiry)
            .build();

        Self {
            cache: Some(cache),
            default_ttl: config.ttl(),
        }
    }

    /// Create a no-op cache.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            cache: None,
            default_ttl: RenderConfig::default().ttl(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// TTL applied by callers that have no better value.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    #[must_use]
    pub fn get(&self, fingerprint: &str) -> Option<Arc<str>> {
        let cache = self.cache.as_ref()?;
        cache.get(fingerprint).map(|entry| entry.markup)
    }

    pub fn put(&self, fingerprint: String, markup: Arc<str>, ttl: Duration) {
        if let Some(cache) = &self.cache {
            cache.insert(fingerprint, CachedMarkup { markup, ttl });
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            debug!("Render cache cleared");
        }
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.as_ref().map_or(0, |cache| {
            cache.run_pending_tasks();
            cache.entry_count()
        })
    }
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("enabled", &self.is_enabled())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
