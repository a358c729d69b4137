//! Layered configuration for a board session
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Compiled defaults
//! 2. An optional YAML file
//! 3. Environment variables prefixed `SAH_KANBAN_`, nested keys split on `__`
//!    (`SAH_KANBAN_STALENESS__QUOTE_HOURS=48`)

use crate::error::{Result, SyncError};
use crate::types::ColumnTitle;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SAH_KANBAN_";

/// Thresholds and statuses for the border annotation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessRules {
    /// A card in the same status for more than this many business days is flagged
    pub same_status_days: i64,
    /// Business days in parking before a low-queue card is flagged
    pub parking_days: i64,
    /// Highest queue position that still counts as "about to be worked on"
    pub parking_queue_threshold: i64,
    /// Hours before an outstanding quote is flagged
    pub quote_hours: i64,
    pub parking_status: String,
    pub quoted_status: String,
    /// Statuses never flagged for sitting still
    pub exempt_statuses: Vec<String>,
}

impl Default for StalenessRules {
    fn default() -> Self {
        Self {
            same_status_days: 2,
            parking_days: 2,
            parking_queue_threshold: 5,
            quote_hours: 24,
            parking_status: "In parking".to_string(),
            quoted_status: "Quoted".to_string(),
            exempt_statuses: vec![
                "In queue".to_string(),
                "In parking".to_string(),
                "Completed".to_string(),
            ],
        }
    }
}

/// Board session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSyncConfig {
    /// Cards fetched per page of a done column
    pub page_size: usize,
    /// Columns whose cards are paginated
    pub done_statuses: Vec<String>,
    /// Indicator used when a column record has none
    pub default_indicator: String,
    /// Indicator palette offered for columns
    pub indicators: Vec<String>,
    /// Entries kept in the mutation journal
    pub journal_capacity: usize,
    /// Entity whose create permission gates adding columns
    pub column_entity: String,
    pub staleness: StalenessRules,
}

impl Default for BoardSyncConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            done_statuses: [
                "Completed",
                "In pause",
                "Cancelled",
                "Quality check approved",
                "No response from customer",
                "Invoice paid",
                "Awaiting pickup",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_indicator: "gray".to_string(),
            indicators: ["green", "blue", "orange", "gray"]
                .into_iter()
                .map(String::from)
                .collect(),
            journal_capacity: 200,
            column_entity: "Custom Field".to_string(),
            staleness: StalenessRules::default(),
        }
    }
}

impl BoardSyncConfig {
    /// Load defaults, then `path` (if given), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            debug!(path = %path.display(), "loading board sync config file");
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document on top of the defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| SyncError::invalid_value("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(SyncError::invalid_value("page_size", "must be greater than 0"));
        }
        if self.journal_capacity == 0 {
            return Err(SyncError::invalid_value(
                "journal_capacity",
                "must be greater than 0",
            ));
        }
        if self.default_indicator.trim().is_empty() {
            return Err(SyncError::invalid_value("default_indicator", "must not be empty"));
        }
        if self.staleness.quote_hours < 0 || self.staleness.same_status_days < 0 {
            return Err(SyncError::invalid_value("staleness", "thresholds must not be negative"));
        }
        Ok(())
    }

    /// The configured done statuses as column titles
    pub fn done_columns(&self) -> BTreeSet<ColumnTitle> {
        self.done_statuses
            .iter()
            .map(|s| ColumnTitle::from(s.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = BoardSyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 10);
        assert!(config.done_columns().contains("Completed"));
        assert_eq!(config.staleness.quote_hours, 24);
    }

    #[test]
    fn test_from_yaml_str_keeps_unset_defaults() {
        let config = BoardSyncConfig::from_yaml_str(
            "page_size: 25\nstaleness:\n  quote_hours: 48\n",
        )
        .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.staleness.quote_hours, 48);
        assert_eq!(config.staleness.parking_days, 2);
        assert_eq!(config.default_indicator, "gray");
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = BoardSyncConfig::from_yaml_str("page_size: 0").unwrap_err();
        assert!(matches!(err, SyncError::InvalidValue { ref field, .. } if field == "page_size"));
    }

    #[test]
    #[serial]
    fn test_load_file_then_env() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "page_size: 5\njournal_capacity: 7").unwrap();

        std::env::set_var("SAH_KANBAN_JOURNAL_CAPACITY", "9");
        std::env::set_var("SAH_KANBAN_STALENESS__PARKING_DAYS", "3");
        let config = BoardSyncConfig::load(Some(file.path()));
        std::env::remove_var("SAH_KANBAN_JOURNAL_CAPACITY");
        std::env::remove_var("SAH_KANBAN_STALENESS__PARKING_DAYS");

        let config = config.unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.journal_capacity, 9);
        assert_eq!(config.staleness.parking_days, 3);
    }

    #[test]
    #[serial]
    fn test_load_rejects_invalid_env() {
        std::env::set_var("SAH_KANBAN_PAGE_SIZE", "0");
        let result = BoardSyncConfig::load(None);
        std::env::remove_var("SAH_KANBAN_PAGE_SIZE");
        assert!(result.is_err());
    }
}
