//! Ordering engine
//!
//! Pure functions deciding which cards show in which column and in what
//! order. Nothing here touches the store; callers commit the results.

use crate::error::{Result, SyncError};
use crate::types::{
    BoardState, Card, CardId, Column, ColumnStatus, ColumnTitle, DropEvent, Indicator, RawColumn,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A card whose column the server changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub name: CardId,
    pub column: ColumnTitle,
}

/// Rendered column -> card order, in column display order
pub type Layout = IndexMap<ColumnTitle, Vec<CardId>>;

/// Map raw column records into columns, defaulting a missing indicator.
pub fn prepare_columns(raw: &[RawColumn], default_indicator: &str) -> Vec<Column> {
    raw.iter()
        .map(|col| Column {
            title: ColumnTitle::from(col.column_name.as_str()),
            status: ColumnStatus::parse(col.status.as_deref()),
            indicator: Indicator::new(
                col.indicator
                    .as_deref()
                    .filter(|i| !i.trim().is_empty())
                    .unwrap_or(default_indicator),
            ),
            order: col.decoded_order(),
        })
        .collect()
}

/// Cards whose column is exactly `column`, in arrival order
pub fn cards_for_column<'a>(cards: &'a [Card], column: &ColumnTitle) -> Vec<&'a Card> {
    cards.iter().filter(|c| &c.column == column).collect()
}

/// Order the cards of one column.
///
/// With an explicit order on a non-done column, cards missing from the order
/// lead in arrival order, followed by the ordered cards; ids that are no
/// longer present are skipped. Otherwise arrival order is kept.
pub fn order_cards<'a>(
    cards_in_column: Vec<&'a Card>,
    explicit_order: Option<&[CardId]>,
    is_done_column: bool,
) -> Vec<&'a Card> {
    let order = match explicit_order {
        Some(order) if !is_done_column => order,
        _ => return cards_in_column,
    };

    let pinned: HashSet<&CardId> = order.iter().collect();
    let mut result: Vec<&Card> = cards_in_column
        .iter()
        .copied()
        .filter(|c| !pinned.contains(&c.name))
        .collect();

    let mut emitted: HashSet<&CardId> = HashSet::new();
    for id in order {
        if !emitted.insert(id) {
            continue;
        }
        if let Some(card) = cards_in_column.iter().find(|c| &c.name == id) {
            result.push(card);
        }
    }
    result
}

/// The cards of `column` exactly as the board shows them
pub fn column_cards<'a>(state: &'a BoardState, column: &Column) -> Vec<&'a Card> {
    order_cards(
        cards_for_column(&state.cards, &column.title),
        column.order.as_deref(),
        state.is_done_column(&column.title),
    )
}

/// Rendered order of every active column
pub fn rendered_layout(state: &BoardState) -> Layout {
    active_columns(&state.columns)
        .map(|column| {
            let ids = column_cards(state, column)
                .into_iter()
                .map(|c| c.name.clone())
                .collect();
            (column.title.clone(), ids)
        })
        .collect()
}

pub fn is_active_column(column: &Column) -> bool {
    column.status != ColumnStatus::Archived
}

pub fn active_columns(columns: &[Column]) -> impl Iterator<Item = &Column> {
    columns.iter().filter(|c| is_active_column(c))
}

pub fn archived_columns(columns: &[Column]) -> impl Iterator<Item = &Column> {
    columns.iter().filter(|c| !is_active_column(c))
}

/// Merge freshly received cards into the loaded set.
///
/// Incoming cards come first and win over an existing card with the same
/// identity; no identity appears twice.
pub fn merge_cards(incoming: Vec<Card>, existing: &[Card]) -> Vec<Card> {
    let mut seen: HashSet<CardId> = HashSet::with_capacity(incoming.len() + existing.len());
    incoming
        .into_iter()
        .chain(existing.iter().cloned())
        .filter(|card| seen.insert(card.name.clone()))
        .collect()
}

/// Replace the card with the same identity. `None` when it is not loaded.
pub fn replace_card(cards: &[Card], card: Card) -> Option<Vec<Card>> {
    let index = cards.iter().position(|c| c.name == card.name)?;
    let mut next = cards.to_vec();
    next[index] = card;
    Some(next)
}

/// Replace the card identified by `id` (a placeholder, typically) with `card`.
pub fn swap_card(cards: &[Card], id: &CardId, card: Card) -> Option<Vec<Card>> {
    let index = cards.iter().position(|c| &c.name == id)?;
    let mut next = cards.to_vec();
    next[index] = card;
    Some(next)
}

/// Apply server-side column assignments to the matching cards
pub fn reassign_columns(cards: &[Card], assignments: &[ColumnAssignment]) -> Vec<Card> {
    cards
        .iter()
        .map(|card| {
            match assignments.iter().rev().find(|a| a.name == card.name) {
                Some(assignment) if assignment.column != card.column => {
                    card.in_column(&assignment.column)
                }
                _ => card.clone(),
            }
        })
        .collect()
}

/// Number of loaded cards per column
pub fn count_by_column(cards: &[Card]) -> BTreeMap<ColumnTitle, usize> {
    let mut counts = BTreeMap::new();
    for card in cards {
        *counts.entry(card.column.clone()).or_insert(0) += 1;
    }
    counts
}

/// Optimistic result of a drop: the card moves to the destination column and
/// the pinned orders of both columns follow the gesture.
pub fn apply_drop(state: &BoardState, drop: &DropEvent) -> Result<(Vec<Card>, Vec<Column>)> {
    let card = state
        .find_card(&drop.card)
        .ok_or_else(|| SyncError::CardNotFound {
            id: drop.card.to_string(),
        })?;
    let destination = state
        .find_column(&drop.to_column)
        .ok_or_else(|| SyncError::ColumnNotFound {
            title: drop.to_column.to_string(),
        })?;

    // What the destination showed before the drop, minus the moving card.
    let mut destination_order: Vec<CardId> = column_cards(state, destination)
        .into_iter()
        .map(|c| c.name.clone())
        .filter(|id| id != &drop.card)
        .collect();
    let index = drop.new_index.min(destination_order.len());
    destination_order.insert(index, drop.card.clone());
    let destination_is_done = state.is_done_column(&drop.to_column);

    let columns = state
        .columns
        .iter()
        .map(|column| {
            if column.title == drop.to_column {
                if destination_is_done {
                    column.clone()
                } else {
                    column.clone().with_order(destination_order.clone())
                }
            } else if column.title == drop.from_column {
                let mut column = column.clone();
                if let Some(order) = column.order.as_mut() {
                    order.retain(|id| id != &drop.card);
                }
                column
            } else {
                column.clone()
            }
        })
        .collect();

    let moved = card.in_column(&drop.to_column);
    let cards = replace_card(&state.cards, moved).unwrap_or_else(|| state.cards.to_vec());
    Ok((cards, columns))
}

/// Pin `card` to the front of `column`'s order, removing it elsewhere.
pub fn pin_to_front(columns: &[Column], column: &ColumnTitle, card: &CardId) -> Vec<Column> {
    columns
        .iter()
        .map(|col| {
            let mut col = col.clone();
            let mut order = col.order.take().unwrap_or_default();
            order.retain(|id| id != card);
            if &col.title == column {
                order.insert(0, card.clone());
            }
            col.order = if order.is_empty() { None } else { Some(order) };
            col
        })
        .collect()
}
