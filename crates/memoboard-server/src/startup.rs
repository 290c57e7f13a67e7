//! Startup output.

use memoboard_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r"
                                  __                         __
   ____ ___  ___  ____ ___  ____ / /_  ____  ____ __________/ /
  / __ `__ \/ _ \/ __ `__ \/ __ \/ __ \/ __ \/ __ `/ ___/ __  /
 / / / / / /  __/ / / / / / /_/ / /_/ / /_/ / /_/ / /  / /_/ /
/_/ /_/ /_/\___/_/ /_/ /_/\____/_.___/\____/\__,_/_/   \__,_/
    ");
}

/// Prints which backends the process is about to use.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Environment:  {}", config.app.environment);
    info!("MySQL pool:   {} connections", config.database.pool_size);
    if config.redis.enabled {
        info!("Feed index:   redis ({} connections)", config.redis.pool_size);
    } else {
        info!("Feed index:   in-process");
    }
    info!(
        "Render cache: {}",
        if config.render.enabled { "enabled" } else { "disabled" }
    );
    info!("Page size:    {}", config.feed.page_size);
    info!("{}", separator);
}
