//! UpdateOrder command

use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering::{self, prepare_columns, Layout};
use crate::remote::{self, method, UpdateOrderArgs, UpdateOrderReply};
use crate::session::BoardSession;
use crate::types::{RollbackSnapshot, StatePatch};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::warn;

/// Send the complete column -> card order to the server and adopt its
/// answer.
///
/// Without an explicit layout the order is taken from what the board
/// currently renders.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Layout>,
}

operation!(
    UpdateOrder,
    verb = "update",
    noun = "order",
    description = "Reconcile the order of every card on the board"
);

impl UpdateOrder {
    /// Reconcile the rendered order
    pub fn rendered() -> Self {
        Self::default()
    }

    /// Reconcile an order reported by the host
    pub fn with_order(order: Layout) -> Self {
        Self { order: Some(order) }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        let snapshot = RollbackSnapshot::capture(&state);
        let order = match &self.order {
            Some(order) => order.clone(),
            None => ordering::rendered_layout(&state),
        };

        let reply: Result<UpdateOrderReply> = remote::submit(
            session.gateway(),
            method::UPDATE_ORDER,
            &UpdateOrderArgs {
                board_name: state.board.name.clone(),
                order: &order,
            },
        )
        .await;

        let UpdateOrderReply(board, assignments) = match reply {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "order update failed, restoring snapshot");
                session.store().replace(snapshot.into_patch());
                return Err(error);
            }
        };

        let cards = ordering::reassign_columns(&session.state().cards, &assignments);
        let columns = prepare_columns(&board.columns, &session.config().default_indicator);
        session
            .store()
            .replace(StatePatch::new().cards(cards).columns(columns));

        Ok(Outcome::Committed(json!({
            "order": order,
            "updated_cards": assignments,
        })))
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for UpdateOrder {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}
