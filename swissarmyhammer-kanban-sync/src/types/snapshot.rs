//! Rollback snapshots and move descriptors.

use super::board::{BoardState, StatePatch};
use super::card::Card;
use super::column::Column;
use super::ids::{CardId, ColumnTitle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable copy of `{cards, columns}` taken right before an optimistic
/// mutation. Owned by the mutation that took it and consumed on restore.
#[derive(Debug, Clone)]
pub struct RollbackSnapshot {
    cards: Arc<Vec<Card>>,
    columns: Arc<Vec<Column>>,
}

impl RollbackSnapshot {
    pub fn capture(state: &BoardState) -> Self {
        Self {
            cards: state.cards.clone(),
            columns: state.columns.clone(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Patch that puts the captured fields back
    pub fn into_patch(self) -> StatePatch {
        StatePatch {
            cards: Some(self.cards),
            columns: Some(self.columns),
            ..StatePatch::default()
        }
    }
}

/// What the drag collaborator reports when a card is dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub card: CardId,
    pub from_column: ColumnTitle,
    pub to_column: ColumnTitle,
    pub old_index: usize,
    pub new_index: usize,
}

impl DropEvent {
    pub fn new(
        card: impl Into<CardId>,
        from_column: impl Into<ColumnTitle>,
        to_column: impl Into<ColumnTitle>,
        old_index: usize,
        new_index: usize,
    ) -> Self {
        Self {
            card: card.into(),
            from_column: from_column.into(),
            to_column: to_column.into(),
            old_index,
            new_index,
        }
    }
}

/// The single card move currently waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PendingMove {
    /// An existing card changed position
    Reorder(DropEvent),
    /// A freshly inserted card is being placed in its column
    Placement { card: CardId, column: ColumnTitle },
}

impl PendingMove {
    pub fn card(&self) -> &CardId {
        match self {
            Self::Reorder(drop) => &drop.card,
            Self::Placement { card, .. } => card,
        }
    }

    pub fn destination(&self) -> &ColumnTitle {
        match self {
            Self::Reorder(drop) => &drop.to_column,
            Self::Placement { column, .. } => column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatePatch;

    #[test]
    fn test_snapshot_restores_captured_fields() {
        let mut state = BoardState::default();
        StatePatch::new()
            .columns(vec![Column::new("In queue", "gray")])
            .apply_to(&mut state);
        let snapshot = RollbackSnapshot::capture(&state);

        StatePatch::new().columns(Vec::new()).apply_to(&mut state);
        assert!(state.columns.is_empty());

        snapshot.into_patch().apply_to(&mut state);
        assert_eq!(state.columns.len(), 1);
        assert_eq!(state.columns[0].title, "In queue");
    }

    #[test]
    fn test_pending_move_accessors() {
        let pending = PendingMove::Reorder(DropEvent::new("X", "In queue", "In repair", 0, 1));
        assert_eq!(pending.card(), &CardId::from("X"));
        assert_eq!(pending.destination(), &ColumnTitle::from("In repair"));
    }
}
