//! Rendering through the render cache.

use crate::cache::RenderCache;
use crate::metrics;
use crate::render::{fingerprint, MarkupRenderer};
use std::sync::Arc;
use tracing::trace;

/// Renders memo bodies, consulting the render cache first.
///
/// A miss renders synchronously and stores the result, so output never
/// depends on whether the cache is enabled.
pub struct MarkupService {
    renderer: Arc<dyn MarkupRenderer>,
    cache: RenderCache,
}

impl MarkupService {
    #[must_use]
    pub fn new(renderer: Arc<dyn MarkupRenderer>, cache: RenderCache) -> Self {
        Self { renderer, cache }
    }

    /// Returns the markup for `body`.
    pub fn render_markup(&self, body: &str) -> Arc<str> {
        let key = fingerprint(body);
        if let Some(markup) = self.cache.get(&key) {
            metrics::record_render_cache(true);
            return markup;
        }

        metrics::record_render_cache(false);
        trace!(fingerprint = %key, "Render cache miss");
        let markup: Arc<str> = Arc::from(self.renderer.render(body));
        self.cache
            .put(key, Arc::clone(&markup), self.cache.default_ttl());
        markup
    }

    /// Renders `body` into the cache unless it is already there. Returns
    /// true when a render happened.
    pub fn warm(&self, body: &str) -> bool {
        if !self.cache.is_enabled() {
            return false;
        }

        let key = fingerprint(body);
        if self.cache.get(&key).is_some() {
            return false;
        }

        let markup = Arc::from(self.renderer.render(body));
        self.cache.put(key, markup, self.cache.default_ttl());
        true
    }

    #[must_use]
    pub const fn cache(&self) -> &RenderCache {
        &self.cache
    }
}

impl std::fmt::Debug for MarkupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkupService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
