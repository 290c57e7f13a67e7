//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use memoboard_core::{MemoError, MemoResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable selecting the `config/{environment}.toml` layer.
pub const ENVIRONMENT_VAR: &str = "MEMOBOARD_ENVIRONMENT";

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides, not committed
    /// 4. Environment variables, e.g. `MEMOBOARD__DATABASE__URL`
    pub fn new(config_dir: impl Into<PathBuf>) -> MemoResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        Self::with_environment(config_dir, &environment)
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> MemoResult<Self> {
        Self::new("./config")
    }

    /// Loads configuration for an explicit environment name.
    pub fn with_environment(config_dir: impl Into<PathBuf>, environment: &str) -> MemoResult<Self> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir, environment)?;

        Ok(Self { config, config_dir })
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Returns the directory the configuration was read from.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn load_config(config_dir: &Path, environment: &str) -> MemoResult<AppConfig> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for layer in ["default", environment, "local"] {
            let path = config_dir.join(format!("{layer}.toml"));
            if path.exists() {
                debug!("Loading {} config from: {}", layer, path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("MEMOBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize::<AppConfig>)
            .map_err(config_error_to_memo_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> MemoResult<()> {
        if config.app.environment == "production" && !config.redis.enabled {
            warn!("Redis is disabled in production; feeds are held in process memory only");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            MemoError::Configuration(message)
        })
    }
}

fn config_error_to_memo_error(err: ConfigError) -> MemoError {
    MemoError::Configuration(err.to_string())
}
