//! Border annotations: staleness hints shown on cards.
//!
//! Elapsed time is measured with a weekend-collapsing heuristic, not calendar
//! business days. See [`business_days`].

use crate::config::StalenessRules;
use crate::types::Card;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

pub const PARKING_MESSAGE: &str = "2 days since moved to parking.";
pub const QUOTE_MESSAGE: &str = "The quote was sent over a day ago.";
pub const SAME_STATUS_MESSAGE: &str = "2 days in the same status";

/// Hint attached to a card; no message means no border
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BorderAnnotation {
    pub message: Option<String>,
}

impl BorderAnnotation {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.message.is_some()
    }
}

/// An outstanding quotation draft for a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationDraft {
    pub name: String,
    /// Name of the card the quote was made for
    pub parent: String,
    pub modified: NaiveDateTime,
}

/// Days elapsed from `start` to `end`, both inclusive.
///
/// Weekdays count one each. The first weekend day met counts one and every
/// later weekend day counts nothing; if any weekend day was met the total
/// drops by one. Returns 0 when `end` precedes `start`.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> i64 {
    let mut days = 0;
    let mut seen_weekend = false;
    let mut current = start;
    while current <= end {
        if is_weekend(current) {
            if !seen_weekend {
                days += 1;
                seen_weekend = true;
            }
        } else {
            days += 1;
        }
        current += Duration::days(1);
    }
    if seen_weekend {
        days -= 1;
    }
    days
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Pick the annotation for a card. Parking beats quote, quote beats same status.
pub fn compute_border_annotation(
    card: &Card,
    now: NaiveDateTime,
    rules: &StalenessRules,
    drafts: &[QuotationDraft],
) -> BorderAnnotation {
    let status = card
        .document
        .status
        .as_deref()
        .unwrap_or(card.column.as_str());
    let today = now.date();

    let parked_too_long = status == rules.parking_status
        && card
            .document
            .queue_position
            .is_some_and(|pos| pos <= rules.parking_queue_threshold)
        && card
            .document
            .parking_date
            .is_some_and(|parked| business_days(parked.date(), today) >= rules.parking_days);
    if parked_too_long {
        return BorderAnnotation::with_message(PARKING_MESSAGE);
    }

    let quote_outstanding = status == rules.quoted_status
        && drafts
            .iter()
            .find(|draft| card.name == draft.parent.as_str())
            .is_some_and(|draft| now - draft.modified >= Duration::hours(rules.quote_hours));
    if quote_outstanding {
        return BorderAnnotation::with_message(QUOTE_MESSAGE);
    }

    let stuck = !rules.exempt_statuses.iter().any(|s| s == status)
        && card
            .status_modified
            .is_some_and(|changed| business_days(changed.date(), today) > rules.same_status_days);
    if stuck {
        return BorderAnnotation::with_message(SAME_STATUS_MESSAGE);
    }

    BorderAnnotation::default()
}
