//! Redis key builder for feeds.

use memoboard_core::FeedKey;

/// Maps feeds to Redis keys under an optional namespace prefix.
#[derive(Debug, Clone, Default)]
pub struct FeedKeys {
    prefix: String,
}

impl FeedKeys {
    /// Create a key builder. An empty prefix yields the bare key names.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The Redis key holding `feed`.
    #[must_use]
    pub fn key(&self, feed: FeedKey) -> String {
        format!("{}{}", self.prefix, feed)
    }

    /// `SCAN MATCH` patterns covering every feed key this builder produces.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        let prefix = escape_glob(&self.prefix);
        vec![
            format!("{prefix}public_memo_list"),
            format!("{prefix}user_memo_list:*"),
            format!("{prefix}user_public_memo_list:*"),
        ]
    }
}

fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoboard_core::UserId;

    #[test]
    fn test_bare_keys() {
        let keys = FeedKeys::default();
        assert_eq!(keys.key(FeedKey::Public), "public_memo_list");
        assert_eq!(keys.key(FeedKey::User(UserId::new(3))), "user_memo_list:3");
    }

    #[test]
    fn test_prefixed_keys() {
        let keys = FeedKeys::new("mb:");
        assert_eq!(
            keys.key(FeedKey::UserPublic(UserId::new(8))),
            "mb:user_public_memo_list:8"
        );
        assert_eq!(keys.patterns()[1], "mb:user_memo_list:*");
    }

    #[test]
    fn test_prefix_glob_characters_escaped() {
        let keys = FeedKeys::new("a*b:");
        assert_eq!(keys.patterns()[0], "a\\*b:public_memo_list");
    }
}
