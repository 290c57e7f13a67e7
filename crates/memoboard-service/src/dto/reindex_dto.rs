//! Reindex DTOs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a reindex run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Users loaded into the name table.
    pub users: u64,
    /// Memos appended to the index.
    pub memos: u64,
    /// Atomic index batches submitted.
    pub batches: u64,
    /// Bodies rendered into the render cache.
    pub warmed: u64,
    /// Wall-clock duration.
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_serialized_as_millis() {
        let report = ReindexReport {
            users: 2,
            memos: 3,
            batches: 1,
            warmed: 3,
            elapsed: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed"], 1500);
    }
}
