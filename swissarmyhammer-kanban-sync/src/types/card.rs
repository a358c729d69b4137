//! Card types and typed construction from raw documents.
//!
//! Raw documents arrive as JSON objects whose shape depends on the board's
//! record type. [`Card::from_document`] copies exactly the fields listed here
//! and ignores everything else.

use super::badges::{LoanCarStatus, PartsStatus, PaymentStatus, SoftwareStatus};
use super::ids::{CardId, ColumnTitle};
use crate::annotation::BorderAnnotation;
use crate::error::{Result, SyncError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Raw document as returned by the remote end
pub type RawDocument = Map<String, Value>;

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub name: CardId,
    pub doctype: String,
    pub column: ColumnTitle,
    pub title: String,
    /// Assignee user ids, in assignment order
    pub assignees: Vec<String>,
    pub tags: BTreeSet<String>,
    pub liked_by: Vec<String>,
    pub creation: Option<NaiveDateTime>,
    /// When the card last changed column
    pub status_modified: Option<NaiveDateTime>,
    pub comment_count: u32,
    pub color: Option<String>,
    pub image: Option<String>,
    /// False while the card only exists locally
    pub interactive: bool,
    pub has_unread_conversation: bool,
    pub annotation: BorderAnnotation,
    pub document: Arc<CardDocument>,
}

/// Field names needed to turn a raw document into a [`Card`]
#[derive(Debug, Clone, Copy)]
pub struct CardContext<'a> {
    pub doctype: &'a str,
    /// Field holding the card title, if the record type has one
    pub title_field: Option<&'a str>,
    /// Field whose value names the card's column
    pub column_field: &'a str,
    pub image_field: Option<&'a str>,
}

impl Card {
    /// Build a card from a raw document.
    ///
    /// Fails when the document has no `name` or no value for the column field.
    pub fn from_document(raw: &RawDocument, ctx: &CardContext<'_>) -> Result<Self> {
        let name = str_field(raw, "name").ok_or_else(|| SyncError::missing_field("name"))?;
        let column = str_field(raw, ctx.column_field)
            .ok_or_else(|| SyncError::missing_field(ctx.column_field))?;
        let title = ctx
            .title_field
            .and_then(|field| str_field(raw, field))
            .unwrap_or(name)
            .to_string();

        Ok(Self {
            name: CardId::from(name),
            doctype: ctx.doctype.to_string(),
            column: ColumnTitle::from(column),
            title,
            assignees: assignees(raw),
            tags: user_tags(raw),
            liked_by: string_list(raw.get("_liked_by")),
            creation: str_field(raw, "creation").and_then(parse_timestamp),
            status_modified: str_field(raw, "status_modified").and_then(parse_timestamp),
            comment_count: comment_count(raw),
            color: str_field(raw, "color").map(str::to_string),
            image: ctx
                .image_field
                .and_then(|field| str_field(raw, field))
                .map(str::to_string),
            interactive: true,
            has_unread_conversation: false,
            annotation: BorderAnnotation::default(),
            document: Arc::new(CardDocument::from_raw(raw)),
        })
    }

    /// Copy of this card placed in another column
    pub fn in_column(&self, column: &ColumnTitle) -> Self {
        let mut card = self.clone();
        card.column = column.clone();
        card
    }
}

/// The fields of the underlying document that the board reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CardDocument {
    pub status: Option<String>,
    pub queue_position: Option<i64>,
    pub parking_date: Option<NaiveDateTime>,
    pub appointment_date: Option<NaiveDate>,
    pub customer_phone: Option<String>,
    pub client_description: Option<String>,
    pub parts: PartsStatus,
    pub software: SoftwareStatus,
    pub loan_car: LoanCarStatus,
    pub payment: PaymentStatus,
}

impl CardDocument {
    /// Extract the known fields from a raw document
    pub fn from_raw(raw: &RawDocument) -> Self {
        Self {
            status: str_field(raw, "status").map(str::to_string),
            queue_position: raw.get("queue_position").and_then(as_i64),
            parking_date: str_field(raw, "parking_date").and_then(parse_timestamp),
            appointment_date: str_field(raw, "appointment_date")
                .and_then(parse_timestamp)
                .map(|ts| ts.date()),
            customer_phone: str_field(raw, "custom_customers_phone_number").map(str::to_string),
            client_description: str_field(raw, "client_description").map(str::to_string),
            parts: PartsStatus::parse(str_field(raw, "parts_status")),
            software: SoftwareStatus::parse(str_field(raw, "software_status")),
            loan_car: LoanCarStatus::parse(str_field(raw, "is_loan_car")),
            payment: PaymentStatus::parse(str_field(raw, "payment_status")),
        }
    }
}

/// Parse the timestamp formats the remote end emits.
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.ffffff]`, the `T`-separated variant, RFC 3339
/// and bare dates (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Non-empty string field
fn str_field<'a>(raw: &'a RawDocument, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A list that is either a JSON array or a JSON-encoded array in a string
fn string_list(value: Option<&Value>) -> Vec<String> {
    let parsed;
    let value = match value {
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(_) => return Vec::new(),
        },
        Some(v) => v,
        None => return Vec::new(),
    };
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn assignees(raw: &RawDocument) -> Vec<String> {
    match raw.get("assigned_list") {
        Some(list @ Value::Array(_)) => string_list(Some(list)),
        _ => string_list(raw.get("_assign")),
    }
}

/// Tags are stored comma separated, usually with a leading comma
fn user_tags(raw: &RawDocument) -> BTreeSet<String> {
    str_field(raw, "_user_tags")
        .map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn comment_count(raw: &RawDocument) -> u32 {
    ["comment_count", "_comment_count"]
        .iter()
        .filter_map(|key| raw.get(*key).and_then(as_i64))
        .find(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}
