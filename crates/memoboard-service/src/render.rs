//! Markdown rendering and fingerprints.

use comrak::Options;
use sha2::{Digest, Sha256};

/// Pure body-to-markup conversion.
pub trait MarkupRenderer: Send + Sync {
    /// Renders a memo body. Must be deterministic.
    fn render(&self, body: &str) -> String;
}

/// CommonMark renderer with the GitHub table, strikethrough and autolink
/// extensions. Raw HTML in bodies is escaped.
pub struct MarkdownRenderer {
    options: Options<'static>,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.tagfilter = true;
        options.render.r#unsafe = false;
        Self { options }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupRenderer for MarkdownRenderer {
    fn render(&self, body: &str) -> String {
        comrak::markdown_to_html(body, &self.options)
    }
}

impl std::fmt::Debug for MarkdownRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownRenderer").finish_non_exhaustive()
    }
}

/// Render cache key for a body: lowercase hex SHA-256.
#[must_use]
pub fn fingerprint(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}
