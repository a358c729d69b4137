//! Optimistic state synchronization for kanban board front ends
//!
//! This crate keeps a board's cards and columns in a single snapshot store,
//! applies user gestures to it immediately and reconciles them with a remote
//! document server afterwards. A failed remote call restores the exact
//! snapshot taken before the gesture.
//!
//! ## Overview
//!
//! - **One store per board** - Immutable snapshots, selector subscriptions
//! - **Optimistic moves** - A drop is visible at once; the board freezes until confirmed
//! - **Rollback** - Every mutation captures its snapshot before touching state
//! - **Paginated done columns** - Pages merge into the loaded cards without duplicates
//! - **Journaled** - Every committed or rolled-back mutation leaves a log entry
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swissarmyhammer_kanban_sync::{
//!     AllowAll, BoardSession, BoardSyncConfig, DropEvent, InitOptions, MoveCard, RemoteGateway,
//! };
//!
//! # async fn example(
//! #     gateway: Arc<dyn RemoteGateway>,
//! #     opts: InitOptions,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = BoardSyncConfig::load(None)?;
//! let session = BoardSession::new(gateway, Arc::new(AllowAll), config);
//! session.open(opts).await?;
//!
//! let result = session
//!     .dispatch(&MoveCard::new(DropEvent::new("PRJ-0001", "In queue", "In repair", 0, 0)))
//!     .await?;
//! println!("Card now in {}", result["column"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Remote methods
//!
//! All server traffic goes through [`RemoteGateway::call`] with a method path
//! from [`remote::method`] and a JSON argument object. Hosts provide the
//! transport; tests use `test_support::ScriptedGateway`.

pub mod annotation;
pub mod capability;
pub mod clock;
pub mod config;
pub mod coordinator;
mod error;
pub mod operation;
pub mod ordering;
pub mod remote;
mod session;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use operation::{async_trait, Execute, ExecutionResult, LogEntry, Operation};

pub use annotation::{business_days, compute_border_annotation, BorderAnnotation, QuotationDraft};
pub use capability::{AllowAll, Capabilities};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BoardSyncConfig, StalenessRules};
pub use coordinator::{
    AddCard, AddCardOutcome, AddColumn, ArchiveColumn, LoadMore, MoveCard, PlaceCard,
    RestoreColumn, SetIndicator, UpdateColumnOrder, UpdateOrder,
};
pub use error::{RemoteError, Result, SyncError, GENERIC_FAILURE_MESSAGE};
pub use ordering::{ColumnAssignment, Layout};
pub use remote::RemoteGateway;
pub use session::{BoardSession, CardSize, InitOptions};
pub use store::{SnapshotStore, SubscriptionId};

// Re-export commonly used types
pub use types::{
    BoardRecord, BoardState, Card, CardId, CardMeta, Column, ColumnStatus, ColumnTitle, DropEvent,
    FilterContext, PendingMove, RawColumn, RawDocument, RollbackSnapshot, StatePatch,
};
