//! In-process caches.
//!
//! Both caches are advisory: clearing or disabling them changes latency,
//! never output.

mod count_cache;
mod render_cache;

pub use count_cache::CountCache;
pub use render_cache::RenderCache;
