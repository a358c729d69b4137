//! AddColumn command

use super::customize;
use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering::prepare_columns;
use crate::remote::{self, method, ColumnArgs};
use crate::session::BoardSession;
use crate::types::{RawColumn, StatePatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

pub const NOT_ALLOWED_MESSAGE: &str = "You are not allowed to create columns";

/// Add a column to the board.
///
/// The title is added to the options of the board's Select field before the
/// board itself learns about the column.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddColumn {
    pub title: String,
}

operation!(
    AddColumn,
    verb = "add",
    noun = "column",
    description = "Add a new column to the board"
);

impl AddColumn {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        if !session
            .capabilities()
            .can_create(&session.config().column_entity)
        {
            return Err(SyncError::permission_denied(NOT_ALLOWED_MESSAGE));
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SyncError::invalid_value("title", "column title must not be empty"));
        }

        let field_name = state.board.field_name.clone();
        customize(session, &state.doctype, |doc| {
            doc.add_option(&field_name, title);
        })
        .await?;

        let raw: Vec<RawColumn> = remote::submit(
            session.gateway(),
            method::ADD_COLUMN,
            &ColumnArgs {
                board_name: state.board.name.clone(),
                column_title: title.to_string(),
            },
        )
        .await?;

        let columns = prepare_columns(&raw, &session.config().default_indicator);
        let value = serde_json::to_value(&columns)?;
        session.store().replace(StatePatch::new().columns(columns));
        Ok(Outcome::Committed(value))
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for AddColumn {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}
