//! Core types for the synchronization engine

mod badges;
mod board;
mod card;
mod column;
mod ids;
mod snapshot;

// Re-export all types
pub use badges::{LoanCarStatus, PartsStatus, PaymentStatus, SoftwareStatus, Tone};
pub use board::{BoardRecord, BoardState, CardMeta, Filter, FilterContext, StatePatch, TitleField};
pub use card::{parse_timestamp, Card, CardContext, CardDocument, RawDocument};
pub use column::{Column, ColumnStatus, Indicator, RawColumn};
pub use ids::{CardId, ColumnTitle};
pub use snapshot::{DropEvent, PendingMove, RollbackSnapshot};
