//! SetIndicator command

use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering::prepare_columns;
use crate::remote::{self, method, SetIndicatorArgs};
use crate::session::BoardSession;
use crate::types::{BoardRecord, ColumnTitle, StatePatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Change a column's colour tag
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SetIndicator {
    pub column: ColumnTitle,
    pub indicator: String,
}

operation!(
    SetIndicator,
    verb = "set",
    noun = "indicator",
    description = "Set the indicator colour of a column"
);

impl SetIndicator {
    pub fn new(column: impl Into<ColumnTitle>, indicator: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            indicator: indicator.into(),
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        if state.find_column(&self.column).is_none() {
            return Err(SyncError::ColumnNotFound {
                title: self.column.to_string(),
            });
        }
        if self.indicator.trim().is_empty() {
            return Err(SyncError::invalid_value("indicator", "must not be empty"));
        }

        let board: BoardRecord = remote::submit(
            session.gateway(),
            method::SET_INDICATOR,
            &SetIndicatorArgs {
                board_name: state.board.name.clone(),
                column_name: self.column.to_string(),
                indicator: self.indicator.clone(),
            },
        )
        .await?;

        let columns = prepare_columns(&board.columns, &session.config().default_indicator);
        let value = serde_json::to_value(&columns)?;
        session.store().replace(StatePatch::new().columns(columns));
        Ok(Outcome::Committed(value))
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for SetIndicator {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}
