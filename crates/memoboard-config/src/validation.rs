//! Configuration validation module.
//!
//! Validates every section at load time, failing fast on invalid
//! configuration rather than at the first request.

use crate::AppConfig;
use memoboard_core::PageRequest;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// URL is missing or malformed.
    InvalidUrl { url_type: String, message: String },
    /// A size that must be positive is zero.
    ZeroSize { name: String },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { name: String, value: u32, maximum: u32 },
    /// Page size exceeds maximum allowed.
    PageSizeTooLarge { value: usize, maximum: usize },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {url_type} URL: {message}")
            }
            Self::ZeroSize { name } => write!(f, "'{name}' must be greater than zero"),
            Self::PoolSizeTooLarge {
                name,
                value,
                maximum,
            } => {
                write!(f, "{name} {value} exceeds maximum allowed ({maximum})")
            }
            Self::PageSizeTooLarge { value, maximum } => {
                write!(f, "Page size {value} exceeds maximum allowed ({maximum})")
            }
            Self::NonPositiveTimeout { name } => {
                write!(f, "Timeout '{name}' must be positive")
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)"
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;

    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_feed(&config.feed, &mut errors);
        Self::validate_render(&config.render, &mut errors);
        Self::validate_reindex(&config.reindex, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_database(config: &crate::DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !config.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }

        if config.pool_size == 0 {
            errors.push(ConfigValidationError::ZeroSize {
                name: "database.pool_size".to_string(),
            });
        } else if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                name: "database.pool_size".to_string(),
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if config.acquire_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.acquire_timeout_secs".to_string(),
            });
        }
        if config.idle_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.idle_timeout_secs".to_string(),
            });
        }
    }

    fn validate_redis(config: &crate::RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        match Url::parse(&config.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss") => {}
            Ok(_) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            }),
            Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            }),
        }

        if config.pool_size == 0 {
            errors.push(ConfigValidationError::ZeroSize {
                name: "redis.pool_size".to_string(),
            });
        } else if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                name: "redis.pool_size".to_string(),
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_feed(config: &crate::FeedConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.page_size == 0 {
            errors.push(ConfigValidationError::ZeroSize {
                name: "feed.page_size".to_string(),
            });
        } else if config.page_size > PageRequest::MAX_SIZE {
            errors.push(ConfigValidationError::PageSizeTooLarge {
                value: config.page_size,
                maximum: PageRequest::MAX_SIZE,
            });
        }

        if config.count_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "feed.count_ttl_secs".to_string(),
            });
        }
    }

    fn validate_render(config: &crate::RenderConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        if config.ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "render.ttl_secs".to_string(),
            });
        }
        if config.max_entries == 0 {
            errors.push(ConfigValidationError::ZeroSize {
                name: "render.max_entries".to_string(),
            });
        }
        if config.warm_concurrency == 0 {
            errors.push(ConfigValidationError::ZeroSize {
                name: "render.warm_concurrency".to_string(),
            });
        }
    }

    fn validate_reindex(config: &crate::ReindexConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.batch_size == 0 {
            errors.push(ConfigValidationError::ZeroSize {
                name: "reindex.batch_size".to_string(),
            });
        }
    }

    fn validate_observability(
        config: &crate::ObservabilityConfig,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}
