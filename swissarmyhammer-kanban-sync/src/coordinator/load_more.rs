//! LoadMore command

use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::remote::{self, method, PageQuery, PageReply};
use crate::session::BoardSession;
use crate::types::{BoardState, ColumnTitle, RawDocument};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::debug;

/// Fetch the next page of a done column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadMore {
    pub column: ColumnTitle,
}

operation!(
    LoadMore,
    verb = "load",
    noun = "more",
    description = "Load the next page of cards in a done column"
);

impl LoadMore {
    pub fn new(column: impl Into<ColumnTitle>) -> Self {
        Self {
            column: column.into(),
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        if !state.is_done_column(&self.column) {
            return Err(SyncError::invalid_value(
                "column",
                format!("{} is not a paginated column", self.column),
            ));
        }
        let Some(_loading) = session.begin_loading(&self.column) else {
            debug!(column = %self.column, "page fetch already in flight");
            return Ok(Outcome::Unchanged(json!({
                "column": self.column,
                "in_flight": true,
            })));
        };

        let offset = cards_in(&state, &self.column);
        let docs = fetch_page(session, &state, &self.column, offset).await?;
        let fetched = session.update_cards(&docs);
        let total = cards_in(&session.state(), &self.column);
        debug!(column = %self.column, offset, fetched, total, "page merged");

        Ok(Outcome::Committed(json!({
            "column": self.column,
            "fetched": fetched,
            "total": total,
        })))
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for LoadMore {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}

fn cards_in(state: &BoardState, column: &ColumnTitle) -> usize {
    state.cards.iter().filter(|c| &c.column == column).count()
}

/// One page of the documents sitting in `column`, starting at `start`
pub(crate) async fn fetch_page(
    session: &BoardSession,
    state: &BoardState,
    column: &ColumnTitle,
    start: usize,
) -> Result<Vec<RawDocument>> {
    let query = PageQuery::by_field(
        &state.doctype,
        &state.board.field_name,
        column.as_str(),
        start,
        session.config().page_size,
    );
    let reply: PageReply = remote::submit(session.gateway(), method::REPORTVIEW_GET, &query).await?;
    Ok(reply.into_documents())
}
