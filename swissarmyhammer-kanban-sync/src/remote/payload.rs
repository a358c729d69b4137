//! Typed request and reply payloads

use crate::ordering::{ColumnAssignment, Layout};
use crate::types::{BoardRecord, ColumnTitle, RawDocument};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `add_column` arguments
#[derive(Debug, Clone, Serialize)]
pub struct ColumnArgs {
    pub board_name: String,
    pub column_title: String,
}

/// `archive_restore_column` arguments
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveRestoreArgs {
    pub board_name: String,
    pub column_title: String,
    /// "Archived" or "Active"
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchCustomizationArgs {
    pub doc_type: String,
}

/// The customization document of a record type.
///
/// Only the field list is interpreted; every other key is carried through
/// untouched so saving writes back what was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationDoc {
    #[serde(default)]
    pub fields: Vec<CustomizationField>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationField {
    pub fieldname: String,
    #[serde(default)]
    pub fieldtype: String,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl CustomizationDoc {
    /// Add `title` to the options of the Select field `field_name`.
    ///
    /// Returns false when no such field exists or the option is already there.
    pub fn add_option(&mut self, field_name: &str, title: &str) -> bool {
        let mut added = false;
        for field in self
            .fields
            .iter_mut()
            .filter(|f| f.fieldname == field_name && f.fieldtype == "Select")
        {
            let options = field.options.get_or_insert_with(String::new);
            if !options.split('\n').any(|o| o == title) {
                options.push('\n');
                options.push_str(title);
                added = true;
            }
        }
        added
    }
}

/// Reply of `fetch_to_customize`
#[derive(Debug, Clone, Deserialize)]
pub struct CustomizationReply {
    pub docs: Vec<CustomizationDoc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveCustomizationArgs<'a> {
    pub doc: &'a CustomizationDoc,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertArgs<'a> {
    pub doc: &'a RawDocument,
}

/// `add_card`: place a freshly inserted card
#[derive(Debug, Clone, Serialize)]
pub struct AddCardArgs {
    pub board_name: String,
    pub docname: String,
    pub colname: String,
}

/// `update_order_for_single_card`
#[derive(Debug, Clone, Serialize)]
pub struct SingleCardArgs {
    pub board_name: String,
    pub docname: String,
    pub from_colname: String,
    pub to_colname: String,
    pub old_index: usize,
    pub new_index: usize,
}

/// Column the server resolved for a placed card, if the reply carries one
pub fn assigned_column(reply: &Value) -> Option<ColumnTitle> {
    reply
        .get("column")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(ColumnTitle::from)
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrderArgs<'a> {
    pub board_name: String,
    pub order: &'a Layout,
}

/// `update_order` reply: the board and the cards whose column changed
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderReply(pub BoardRecord, pub Vec<ColumnAssignment>);

#[derive(Debug, Clone, Serialize)]
pub struct UpdateColumnOrderArgs<'a> {
    pub board_name: String,
    pub order: &'a [ColumnTitle],
}

#[derive(Debug, Clone, Serialize)]
pub struct SetIndicatorArgs {
    pub board_name: String,
    pub column_name: String,
    pub indicator: String,
}

/// One page of a list query
#[derive(Debug, Clone, Serialize)]
pub struct PageQuery {
    pub doctype: String,
    pub fields: Vec<String>,
    pub filters: Vec<(String, String, String)>,
    pub start: usize,
    pub page_length: usize,
    pub view: &'static str,
    pub group_by: String,
    pub with_comment_count: u8,
}

impl PageQuery {
    /// Page of the cards whose `field` equals `value`
    pub fn by_field(
        doctype: &str,
        field: &str,
        value: &str,
        start: usize,
        page_length: usize,
    ) -> Self {
        Self {
            doctype: doctype.to_string(),
            fields: vec!["*".to_string()],
            filters: vec![(field.to_string(), "=".to_string(), value.to_string())],
            start,
            page_length,
            view: "List",
            group_by: format!("`tab{doctype}`.`name`"),
            with_comment_count: 1,
        }
    }
}

/// Columnar page reply: one key list, one value row per record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageReply {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl PageReply {
    /// Zip every row with the keys
    pub fn into_documents(self) -> Vec<RawDocument> {
        let keys = self.keys;
        self.values
            .into_iter()
            .map(|row| keys.iter().cloned().zip(row).collect())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListQuery {
    pub doctype: String,
    pub filters: Value,
    pub fields: Vec<String>,
}

/// An unread conversation, keyed by the sender's phone number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnreadConversation {
    pub name: String,
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetDocArgs {
    pub doctype: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetDocReply {
    #[serde(default)]
    pub docs: Vec<RawDocument>,
}
