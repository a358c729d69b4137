//! AddCard command
//!
//! The board stays frozen from the optimistic append until the new card has
//! been placed, so no move can capture the placeholder in its snapshot.

use super::move_card::place;
use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering;
use crate::remote::{self, method, InsertArgs};
use crate::session::BoardSession;
use crate::types::{
    BoardState, Card, CardId, ColumnTitle, PendingMove, RawDocument, RollbackSnapshot, StatePatch,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

/// Create a card inline from a title typed into a column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddCard {
    pub title: String,
    pub column: ColumnTitle,
}

operation!(
    AddCard,
    verb = "add",
    noun = "card",
    description = "Create a card in a column"
);

/// What adding a card led to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddCardOutcome {
    /// The document was inserted and the card placed
    Inserted { card: Card },
    /// The record type needs its full create form; nothing was changed
    FullFormRequired { doctype: String, values: RawDocument },
}

impl AddCard {
    pub fn new(title: impl Into<String>, column: impl Into<ColumnTitle>) -> Self {
        Self {
            title: title.into(),
            column: column.into(),
        }
    }

    /// Field values for the new document: title, column and every equality
    /// filter the board was opened with.
    fn document_values(&self, state: &BoardState) -> RawDocument {
        let mut values = RawDocument::new();
        if let Some(field) = &state.card_meta.title_field {
            values.insert(field.fieldname.clone(), Value::from(self.title.clone()));
        }
        values.insert(
            state.board.field_name.clone(),
            Value::from(self.column.to_string()),
        );
        for (field, value) in state.filter_context.equalities() {
            values.insert(field.to_string(), value.clone());
        }
        values
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        if !session.capabilities().can_create(&state.doctype) {
            return Err(SyncError::permission_denied(format!(
                "You are not allowed to create {}",
                state.doctype
            )));
        }
        if self.title.trim().is_empty() {
            return Err(SyncError::invalid_value("title", "card title must not be empty"));
        }

        let mut values = self.document_values(&state);
        if state.card_meta.title_field.is_none() || state.card_meta.quick_entry {
            debug!(doctype = %state.doctype, "inline creation unavailable, full form required");
            let outcome = AddCardOutcome::FullFormRequired {
                doctype: state.doctype.clone(),
                values,
            };
            return Ok(Outcome::Unchanged(serde_json::to_value(&outcome)?));
        }

        let placeholder = CardId::placeholder();
        let guard = session.freeze(PendingMove::Placement {
            card: placeholder.clone(),
            column: self.column.clone(),
        })?;
        values.insert("doctype".to_string(), Value::from(state.doctype.clone()));
        values.insert("name".to_string(), Value::from(placeholder.to_string()));
        let mut pending = session.prepare_card(&values)?;
        pending.interactive = false;

        let state = session.state();
        let snapshot = RollbackSnapshot::capture(&state);
        let mut cards = state.cards.to_vec();
        cards.push(pending);
        session.store().replace(StatePatch::new().cards(cards));

        // The placeholder name must not reach the server.
        let mut doc = values;
        doc.remove("name");
        let inserted: Result<RawDocument> =
            remote::submit(session.gateway(), method::INSERT, &InsertArgs { doc: &doc }).await;
        let card = match inserted.and_then(|confirmed| session.prepare_card(&confirmed)) {
            Ok(card) => card,
            Err(error) => {
                warn!(%error, "card insert failed, restoring snapshot");
                session.store().replace(snapshot.into_patch());
                drop(guard);
                return Err(error);
            }
        };

        let current = session.state();
        let cards = ordering::swap_card(&current.cards, &placeholder, card.clone())
            .unwrap_or_else(|| ordering::merge_cards(vec![card.clone()], &current.cards));
        session.store().replace(StatePatch::new().cards(cards));
        debug!(card = %card.name, column = %card.column, "card inserted");

        // A failed placement leaves the inserted card where the server put it.
        guard.retarget(PendingMove::Placement {
            card: card.name.clone(),
            column: card.column.clone(),
        });
        if let Err(error) = place(session, guard, &card.name, &card.column).await {
            debug!(card = %card.name, %error, "placing new card did not complete");
        }

        let card = session.find_card(&card.name).unwrap_or(card);
        Ok(Outcome::Committed(serde_json::to_value(
            &AddCardOutcome::Inserted { card },
        )?))
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for AddCard {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}
