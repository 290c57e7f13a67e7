//! Command-line surface for the `memoboard` binary.

use clap::{Parser, Subcommand};
use memoboard_core::{FeedKey, MemoId, UserId};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memoboard", version, about = "Memoboard storage administration", long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and per-environment overrides
    #[arg(long, env = "MEMOBOARD_CONFIG_DIR", default_value = "./config")]
    pub config_dir: PathBuf,

    /// Skip the startup reindex even when configured
    #[arg(long, default_value_t = false)]
    pub skip_reindex: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rebuild the feed index and caches from the database
    Reindex,
    /// Print one page of a feed
    Feed {
        /// `public`, `user:<id>` or `user-public:<id>`
        feed: FeedKey,
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Read as this user instead of anonymously
        #[arg(long)]
        as_user: Option<UserId>,
    },
    /// Print one memo with its neighbours
    Memo {
        id: MemoId,
        #[arg(long)]
        as_user: Option<UserId>,
    },
    /// Store a new memo
    Post {
        #[arg(long)]
        user: UserId,
        #[arg(long, default_value_t = false)]
        private: bool,
        body: String,
    },
    /// Check the database and the feed index
    Health,
}

impl Command {
    /// Whether the configured startup reindex should run before this command.
    #[must_use]
    pub const fn wants_startup_reindex(&self) -> bool {
        !matches!(self, Self::Reindex | Self::Health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed() {
        let cli = Cli::try_parse_from(["memoboard", "feed", "user:7", "--page", "2", "--as-user", "7"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Feed {
                feed: FeedKey::User(UserId::new(7)),
                page: 2,
                as_user: Some(UserId::new(7)),
            }
        );
    }

    #[test]
    fn test_parse_post() {
        let cli = Cli::try_parse_from(["memoboard", "post", "--user", "3", "--private", "hello"])
            .unwrap();
        assert_eq!(
            cli.command,
            Command::Post {
                user: UserId::new(3),
                private: true,
                body: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_unknown_feed() {
        assert!(Cli::try_parse_from(["memoboard", "feed", "everyone"]).is_err());
    }

    #[test]
    fn test_startup_reindex_skipped_for_admin_commands() {
        assert!(!Command::Reindex.wants_startup_reindex());
        assert!(!Command::Health.wants_startup_reindex());
        assert!(Command::Memo {
            id: MemoId::new(1),
            as_user: None
        }
        .wants_startup_reindex());
    }
}
