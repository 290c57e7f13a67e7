//! Tracing subscriber setup.

use memoboard_config::{LogFormat, ObservabilityConfig};
use memoboard_core::{MemoError, MemoResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives used when `RUST_LOG` is not set.
#[must_use]
pub fn default_directives(level: &str) -> String {
    if level.eq_ignore_ascii_case("info") {
        "info,memoboard=debug".to_string()
    } else {
        level.to_lowercase()
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &ObservabilityConfig) -> MemoResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .map_err(|e| MemoError::internal(format!("Failed to install logger: {e}")))
}
