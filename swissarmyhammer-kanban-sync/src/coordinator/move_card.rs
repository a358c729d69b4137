//! MoveCard and PlaceCard commands
//!
//! Both hold the board freeze from before the optimistic change until the
//! remote end has answered, so at most one card move is ever in flight.

use super::UpdateOrder;
use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering::{self, ColumnAssignment};
use crate::remote::{self, assigned_column, method, AddCardArgs, SingleCardArgs};
use crate::session::{BoardSession, FreezeGuard};
use crate::types::{CardId, ColumnTitle, DropEvent, PendingMove, RollbackSnapshot, StatePatch};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Move an existing card as reported by a drop gesture
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveCard {
    #[serde(flatten)]
    pub drop: DropEvent,
}

operation!(
    MoveCard,
    verb = "move",
    noun = "card",
    description = "Move a card to another column"
);

impl MoveCard {
    pub fn new(drop: DropEvent) -> Self {
        Self { drop }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        if !session.capabilities().can_write(&state.doctype) {
            return Err(SyncError::permission_denied("You are not allowed to move cards"));
        }

        let guard = session.freeze(PendingMove::Reorder(self.drop.clone()))?;
        let state = session.state();
        let snapshot = RollbackSnapshot::capture(&state);

        if self.drop.from_column == self.drop.to_column {
            debug!(card = %self.drop.card, column = %self.drop.to_column, "move within column, nothing to confirm");
            session.store().replace(snapshot.into_patch());
            drop(guard);
            return Ok(Outcome::Unchanged(json!({
                "card": self.drop.card,
                "column": self.drop.to_column,
            })));
        }

        let (cards, columns) = ordering::apply_drop(&state, &self.drop)?;
        session
            .store()
            .replace(StatePatch::new().cards(cards).columns(columns));

        let submitted = remote::call(
            session.gateway(),
            method::UPDATE_ORDER_FOR_SINGLE_CARD,
            &SingleCardArgs {
                board_name: state.board.name.clone(),
                docname: self.drop.card.to_string(),
                from_colname: self.drop.from_column.to_string(),
                to_colname: self.drop.to_column.to_string(),
                old_index: self.drop.old_index,
                new_index: self.drop.new_index,
            },
        )
        .await;

        settle(
            session,
            guard,
            snapshot,
            &self.drop.card,
            &self.drop.to_column,
            submitted,
        )
        .await
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for MoveCard {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}

/// Give a freshly inserted card its place in a column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceCard {
    pub card: CardId,
    pub column: ColumnTitle,
}

operation!(
    PlaceCard,
    verb = "place",
    noun = "card",
    description = "Place a newly created card in its column"
);

impl PlaceCard {
    pub fn new(card: impl Into<CardId>, column: impl Into<ColumnTitle>) -> Self {
        Self {
            card: card.into(),
            column: column.into(),
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        if state.find_card(&self.card).is_none() {
            return Err(SyncError::CardNotFound {
                id: self.card.to_string(),
            });
        }

        let guard = session.freeze(PendingMove::Placement {
            card: self.card.clone(),
            column: self.column.clone(),
        })?;
        place(session, guard, &self.card, &self.column).await
    }
}

/// Pin `card` to the front of `column` and confirm the placement remotely.
///
/// Runs under a freeze the caller already holds, so a card that was just
/// inserted can be placed without another move slipping in between.
pub(super) async fn place(
    session: &BoardSession,
    guard: FreezeGuard<'_>,
    card: &CardId,
    column: &ColumnTitle,
) -> Result<Outcome> {
    let state = session.state();
    let snapshot = RollbackSnapshot::capture(&state);

    if !state.is_done_column(column) {
        let columns = ordering::pin_to_front(&state.columns, column, card);
        session.store().replace(StatePatch::new().columns(columns));
    }

    let submitted = remote::call(
        session.gateway(),
        method::ADD_CARD,
        &AddCardArgs {
            board_name: state.board.name.clone(),
            docname: card.to_string(),
            colname: column.to_string(),
        },
    )
    .await;

    settle(session, guard, snapshot, card, column, submitted).await
}

#[async_trait]
impl Execute<BoardSession, SyncError> for PlaceCard {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}

/// Finish a card move once the remote end has answered.
///
/// On success the server's column is re-asserted on the card, the freeze is
/// released and a whole-board order reconciliation follows. On failure the
/// snapshot is restored before the freeze is released.
async fn settle(
    session: &BoardSession,
    guard: FreezeGuard<'_>,
    snapshot: RollbackSnapshot,
    card: &CardId,
    requested: &ColumnTitle,
    submitted: Result<Value>,
) -> Result<Outcome> {
    let reply = match submitted {
        Ok(reply) => reply,
        Err(error) => {
            warn!(card = %card, %error, "card move failed, restoring snapshot");
            session.store().replace(snapshot.into_patch());
            drop(guard);
            return Err(error);
        }
    };

    let column = assigned_column(&reply).unwrap_or_else(|| requested.clone());
    let cards = ordering::reassign_columns(
        &session.state().cards,
        &[ColumnAssignment {
            name: card.clone(),
            column: column.clone(),
        }],
    );
    session.store().replace(StatePatch::new().cards(cards));
    drop(guard);
    debug!(card = %card, column = %column, "card move confirmed");

    if let Err(error) = session.dispatch(&UpdateOrder::rendered()).await {
        debug!(%error, "order reconciliation after move did not complete");
    }

    Ok(Outcome::Committed(json!({ "card": card, "column": column })))
}
