//! Closed status enums shown as badges on a card.
//!
//! Each status field of the underlying document arrives as free text. The
//! values are mapped onto closed enums here so the renderer matches
//! exhaustively instead of comparing strings.

use serde::{Deserialize, Serialize};

/// Colour family of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Red,
    Green,
    Gray,
}

impl Tone {
    /// Hex colour used for this tone
    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#d14343",
            Self::Green => "#33ad53",
            Self::Gray => "#d1d1d1",
        }
    }
}

/// Loan car state of a repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCarStatus {
    /// No loan car involved (empty or "No")
    #[default]
    NotRequested,
    /// Customer asked for a loan car ("Yes")
    Requested,
    /// A loan car is out ("Loaned car")
    Loaned,
    /// The loan car came back ("Car returned")
    Returned,
    /// Any value this board does not know
    Unrecognized,
}

impl LoanCarStatus {
    /// Parse the raw document value
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("No") => Self::NotRequested,
            Some("Yes") => Self::Requested,
            Some("Loaned car") => Self::Loaned,
            Some("Car returned") => Self::Returned,
            Some(_) => Self::Unrecognized,
        }
    }

    /// Badge tone, or `None` when no badge is shown
    pub fn tone(self) -> Option<Tone> {
        match self {
            Self::NotRequested | Self::Returned => Some(Tone::Gray),
            Self::Requested => Some(Tone::Red),
            Self::Loaned => Some(Tone::Green),
            Self::Unrecognized => None,
        }
    }
}

/// Spare parts state of a repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartsStatus {
    #[default]
    None,
    NewRequest,
    ReadyForPickup,
    Delivered,
    Unrecognized,
}

impl PartsStatus {
    /// Parse the raw document value
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::None,
            Some("New request") => Self::NewRequest,
            Some("Ready for pickup") => Self::ReadyForPickup,
            Some("Delivered") => Self::Delivered,
            Some(_) => Self::Unrecognized,
        }
    }

    /// Badge tone, or `None` when no badge is shown
    pub fn tone(self) -> Option<Tone> {
        match self {
            Self::NewRequest => Some(Tone::Red),
            Self::ReadyForPickup => Some(Tone::Green),
            Self::None | Self::Delivered => Some(Tone::Gray),
            Self::Unrecognized => None,
        }
    }
}

/// Software state of a repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftwareStatus {
    #[default]
    None,
    Requested,
    ReadyForUse,
    Attached,
    Unrecognized,
}

impl SoftwareStatus {
    /// Parse the raw document value
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::None,
            Some("Software request") => Self::Requested,
            Some("Software is ready for use") => Self::ReadyForUse,
            Some("Software has been attached") => Self::Attached,
            Some(_) => Self::Unrecognized,
        }
    }

    /// Badge tone, or `None` when no badge is shown
    pub fn tone(self) -> Option<Tone> {
        match self {
            Self::Requested => Some(Tone::Red),
            Self::ReadyForUse => Some(Tone::Green),
            Self::None | Self::Attached => Some(Tone::Gray),
            Self::Unrecognized => None,
        }
    }
}

/// Payment state of the quotation attached to a card
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    None,
    QuotationDeclined,
    Other(String),
}

impl PaymentStatus {
    /// Parse the raw document value
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::None,
            Some("Quotation Declined") => Self::QuotationDeclined,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Whether the quotation badge should draw attention
    pub fn is_alert(&self) -> bool {
        match self {
            Self::QuotationDeclined => true,
            Self::None | Self::Other(_) => false,
        }
    }
}
