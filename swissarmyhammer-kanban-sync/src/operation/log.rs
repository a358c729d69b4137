//! Journal entries for executed mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record of one mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique ID for this entry (ULID format)
    pub id: String,

    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g. "move card", "add column")
    pub op: String,

    /// The operation's parameters
    pub input: Value,

    /// The confirmed result, or the error that caused the rollback
    pub output: Value,

    /// Whether the optimistic state was discarded
    #[serde(default)]
    pub rolled_back: bool,

    pub duration_ms: u64,
}

impl LogEntry {
    /// Entry for a confirmed mutation
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            rolled_back: false,
            duration_ms,
        }
    }

    /// Entry for a mutation whose snapshot was restored
    pub fn rolled_back(
        op: impl Into<String>,
        input: Value,
        error: impl std::fmt::Display,
        duration_ms: u64,
    ) -> Self {
        Self {
            rolled_back: true,
            ..Self::new(
                op,
                input,
                serde_json::json!({ "error": error.to_string() }),
                duration_ms,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rolled_back_entry() {
        let entry = LogEntry::rolled_back("move card", json!({"card": "P1"}), "timeout", 12);
        assert!(entry.rolled_back);
        assert_eq!(entry.output["error"], "timeout");
        assert_eq!(entry.id.len(), 26);
    }

    #[test]
    fn test_entry_serializes() {
        let entry = LogEntry::new("add column", json!({"title": "Quoted"}), json!([]), 3);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["op"], "add column");
        assert_eq!(value["rolled_back"], false);
    }
}
