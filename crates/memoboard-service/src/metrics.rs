//! Metrics for the storage core.
//!
//! Counters are recorded through the `metrics` facade; wiring an exporter is
//! left to the embedding process.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for the storage core.
pub mod names {
    /// Index writes that failed after the memo was stored.
    pub const INDEX_WRITE_FAILURES_TOTAL: &str = "memoboard_index_write_failures_total";
    /// Render cache hits.
    pub const RENDER_CACHE_HITS_TOTAL: &str = "memoboard_render_cache_hits_total";
    /// Render cache misses.
    pub const RENDER_CACHE_MISSES_TOTAL: &str = "memoboard_render_cache_misses_total";
    /// Pages served from a stale feed length.
    pub const COUNT_FALLBACKS_TOTAL: &str = "memoboard_count_fallbacks_total";
    /// Completed reindex runs.
    pub const REINDEX_RUNS_TOTAL: &str = "memoboard_reindex_runs_total";
    /// Reindex duration in seconds.
    pub const REINDEX_DURATION_SECONDS: &str = "memoboard_reindex_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::INDEX_WRITE_FAILURES_TOTAL,
        "Memos stored durably whose feed index update failed"
    );
    describe_counter!(
        names::RENDER_CACHE_HITS_TOTAL,
        "Rendered markup served from the cache"
    );
    describe_counter!(
        names::RENDER_CACHE_MISSES_TOTAL,
        "Rendered markup produced on demand"
    );
    describe_counter!(
        names::COUNT_FALLBACKS_TOTAL,
        "Feed pages served with the last known length after a refresh failed"
    );
    describe_counter!(names::REINDEX_RUNS_TOTAL, "Completed reindex runs");
    describe_histogram!(
        names::REINDEX_DURATION_SECONDS,
        "Reindex duration in seconds"
    );
}

pub(crate) fn record_index_write_failure() {
    counter!(names::INDEX_WRITE_FAILURES_TOTAL).increment(1);
}

pub(crate) fn record_render_cache(hit: bool) {
    if hit {
        counter!(names::RENDER_CACHE_HITS_TOTAL).increment(1);
    } else {
        counter!(names::RENDER_CACHE_MISSES_TOTAL).increment(1);
    }
}

pub(crate) fn record_count_fallback() {
    counter!(names::COUNT_FALLBACKS_TOTAL).increment(1);
}

pub(crate) fn record_reindex(elapsed: Duration) {
    counter!(names::REINDEX_RUNS_TOTAL).increment(1);
    histogram!(names::REINDEX_DURATION_SECONDS).record(elapsed.as_secs_f64());
}
