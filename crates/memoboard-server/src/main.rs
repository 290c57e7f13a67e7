//! # Memoboard
//!
//! Administrative entry point for the Memoboard storage core: rebuild the
//! feed index, inspect feeds and memos, post memos, check backend health.
//! Every command prints JSON.

use anyhow::Context;
use clap::Parser;
use memoboard_config::ConfigLoader;
use memoboard_core::{ErrorResponse, MemoError, Visibility};
use memoboard_server::cli::{Cli, Command};
use memoboard_server::logging::init_logging;
use memoboard_server::startup::{print_banner, print_startup_info};
use memoboard_server::{App, AppBuilder};
use serde::Serialize;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Application error: {:#}", e);
        let body = match e.downcast_ref::<MemoError>() {
            Some(memo_error) => ErrorResponse::from_error(memo_error),
            None => ErrorResponse {
                code: "INTERNAL_ERROR".to_string(),
                message: format!("{e:#}"),
            },
        };
        if let Ok(json) = serde_json::to_string_pretty(&body) {
            eprintln!("{json}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::new(&cli.config_dir)?.into_config();
    init_logging(&config.observability)?;

    print_banner();
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    print_startup_info(&config);

    let app = AppBuilder::new().with_config(config).build().await?;

    if cli.command.wants_startup_reindex() && !cli.skip_reindex {
        if let Some(report) = app.startup_reindex().await? {
            info!(memos = report.memos, "Startup reindex complete");
        }
    }

    let result = execute(&app, cli.command).await;
    app.shutdown().await;
    result
}

async fn execute(app: &App, command: Command) -> anyhow::Result<()> {
    let services = app.services();

    match command {
        Command::Reindex => {
            let report = services.reindexer.reindex_all().await?;
            print_json(&report)
        }
        Command::Feed {
            feed,
            page,
            as_user,
        } => {
            let page = services.feeds.get_page(feed, page, as_user).await?;
            print_json(&page)
        }
        Command::Memo { id, as_user } => {
            let detail = services.feeds.get_memo_detail(id, as_user).await?;
            print_json(&detail)
        }
        Command::Post {
            user,
            private,
            body,
        } => {
            let visibility = if private {
                Visibility::Private
            } else {
                Visibility::Public
            };
            let id = services.feeds.create_memo(user, body, visibility).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Command::Health => {
            let report = app.health().await;
            print_json(&report)?;
            if report.healthy {
                Ok(())
            } else {
                Err(MemoError::StoreUnavailable("one or more backends are down".to_string()).into())
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
