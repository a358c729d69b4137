//! Board-level types: the board record, card metadata, filters and the
//! aggregate state held by the snapshot store.

use super::card::Card;
use super::column::{Column, RawColumn};
use super::ids::{CardId, ColumnTitle};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The kanban board document as stored remotely
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardRecord {
    pub name: String,
    #[serde(default)]
    pub reference_doctype: Option<String>,
    /// Field of the record type whose value is the card's column
    pub field_name: String,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
}

/// Title field descriptor of the record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleField {
    pub fieldname: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Card metadata descriptor of the record type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardMeta {
    #[serde(default)]
    pub title_field: Option<TitleField>,
    /// Whether the record type wants its quick-entry dialog instead of inline creation
    #[serde(default, deserialize_with = "flag")]
    pub quick_entry: bool,
    #[serde(default)]
    pub image_field: Option<String>,
}

/// One list filter: `[doctype, fieldname, operator, value]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter(pub String, pub String, pub String, pub Value);

impl Filter {
    pub fn new(
        doctype: impl Into<String>,
        fieldname: impl Into<String>,
        operator: impl Into<String>,
        value: Value,
    ) -> Self {
        Self(doctype.into(), fieldname.into(), operator.into(), value)
    }

    pub fn fieldname(&self) -> &str {
        &self.1
    }

    pub fn operator(&self) -> &str {
        &self.2
    }

    pub fn value(&self) -> &Value {
        &self.3
    }
}

/// Filters active on the list the board was opened from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterContext {
    pub filters: Vec<Filter>,
}

impl FilterContext {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// `(fieldname, value)` for every equality filter
    pub fn equalities(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.filters
            .iter()
            .filter(|f| f.operator() == "=")
            .map(|f| (f.fieldname(), f.value()))
    }
}

/// Everything the board renders from.
///
/// Each field is replaced wholesale; the `Arc`s make a replaced field
/// distinguishable from an untouched one by pointer identity.
#[derive(Debug, Clone)]
pub struct BoardState {
    pub doctype: String,
    pub board: Arc<BoardRecord>,
    pub card_meta: Arc<CardMeta>,
    pub cards: Arc<Vec<Card>>,
    pub columns: Arc<Vec<Column>>,
    /// Columns whose cards are paginated instead of fully loaded
    pub done_statuses: Arc<BTreeSet<ColumnTitle>>,
    pub filter_context: Arc<FilterContext>,
    pub empty_state: bool,
    /// Drag interactions are suspended while a move is being confirmed
    pub frozen: bool,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            doctype: String::new(),
            board: Arc::default(),
            card_meta: Arc::default(),
            cards: Arc::default(),
            columns: Arc::default(),
            done_statuses: Arc::default(),
            filter_context: Arc::default(),
            empty_state: true,
            frozen: false,
        }
    }
}

impl BoardState {
    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.name == id)
    }

    pub fn find_column(&self, title: &ColumnTitle) -> Option<&Column> {
        self.columns.iter().find(|c| &c.title == title)
    }

    pub fn is_done_column(&self, title: &ColumnTitle) -> bool {
        self.done_statuses.contains(title)
    }
}

/// Partial state: every `Some` field replaces the matching field of the state.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub doctype: Option<String>,
    pub board: Option<Arc<BoardRecord>>,
    pub card_meta: Option<Arc<CardMeta>>,
    pub cards: Option<Arc<Vec<Card>>>,
    pub columns: Option<Arc<Vec<Column>>>,
    pub done_statuses: Option<Arc<BTreeSet<ColumnTitle>>>,
    pub filter_context: Option<Arc<FilterContext>>,
    pub empty_state: Option<bool>,
    pub frozen: Option<bool>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = Some(Arc::new(cards));
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = Some(Arc::new(columns));
        self
    }

    pub fn board(mut self, board: BoardRecord) -> Self {
        self.board = Some(Arc::new(board));
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = Some(frozen);
        self
    }

    pub fn empty_state(mut self, empty: bool) -> Self {
        self.empty_state = Some(empty);
        self
    }

    /// Whether the patch replaces nothing
    pub fn is_empty(&self) -> bool {
        self.doctype.is_none()
            && self.board.is_none()
            && self.card_meta.is_none()
            && self.cards.is_none()
            && self.columns.is_none()
            && self.done_statuses.is_none()
            && self.filter_context.is_none()
            && self.empty_state.is_none()
            && self.frozen.is_none()
    }

    /// Merge the patch into a state
    pub fn apply_to(self, state: &mut BoardState) {
        if let Some(doctype) = self.doctype {
            state.doctype = doctype;
        }
        if let Some(board) = self.board {
            state.board = board;
        }
        if let Some(card_meta) = self.card_meta {
            state.card_meta = card_meta;
        }
        if let Some(cards) = self.cards {
            state.cards = cards;
        }
        if let Some(columns) = self.columns {
            state.columns = columns;
        }
        if let Some(done_statuses) = self.done_statuses {
            state.done_statuses = done_statuses;
        }
        if let Some(filter_context) = self.filter_context {
            state.filter_context = filter_context;
        }
        if let Some(empty_state) = self.empty_state {
            state.empty_state = empty_state;
        }
        if let Some(frozen) = self.frozen {
            state.frozen = frozen;
        }
    }
}

/// Accept `true`/`false` as well as the `0`/`1` check values used remotely
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}
