//! Column types: Column, ColumnStatus, Indicator and the raw wire record.

use super::ids::{CardId, ColumnTitle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a column. Columns are archived, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColumnStatus {
    #[default]
    Active,
    Archived,
}

impl ColumnStatus {
    /// Parse the remote status value; anything but "Archived" is active
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Archived") => Self::Archived,
            _ => Self::Active,
        }
    }

    /// Wire value of this status
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Archived => "Archived",
        }
    }
}

/// Colour tag of a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Indicator(String);

impl Indicator {
    pub fn new(color: impl Into<String>) -> Self {
        Self(color.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CSS-friendly class name ("light-blue" for "Light Blue")
    pub fn class_name(&self) -> String {
        self.0
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// A workflow stage on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub title: ColumnTitle,
    pub status: ColumnStatus,
    pub indicator: Indicator,
    /// Manual card order pinned by the user, if any
    pub order: Option<Vec<CardId>>,
}

impl Column {
    /// Create an active column without a pinned order
    pub fn new(title: impl Into<ColumnTitle>, indicator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: ColumnStatus::Active,
            indicator: Indicator::new(indicator),
            order: None,
        }
    }

    pub fn with_order(mut self, order: Vec<CardId>) -> Self {
        self.order = Some(order);
        self
    }
}

/// Column record as stored on the board document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawColumn {
    pub column_name: String,
    #[serde(default)]
    pub status: Option<String>,
    /// JSON-encoded list of card names, or the list itself
    #[serde(default)]
    pub order: Option<Value>,
    #[serde(default)]
    pub indicator: Option<String>,
}

impl RawColumn {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            ..Self::default()
        }
    }

    /// Decode the pinned order. Malformed orders decode as `None`.
    pub fn decoded_order(&self) -> Option<Vec<CardId>> {
        let value = match self.order.as_ref()? {
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => serde_json::from_str::<Value>(s).ok()?,
            other => other.clone(),
        };
        let items = value.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(CardId::from)
                .collect(),
        )
    }
}
