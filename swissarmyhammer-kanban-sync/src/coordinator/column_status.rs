//! ArchiveColumn and RestoreColumn commands

use super::customize;
use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering::prepare_columns;
use crate::remote::{self, method, ArchiveRestoreArgs};
use crate::session::BoardSession;
use crate::types::{ColumnStatus, ColumnTitle, RawColumn, StatePatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Archive a column. Its cards stay where they are.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveColumn {
    pub title: ColumnTitle,
}

operation!(
    ArchiveColumn,
    verb = "archive",
    noun = "column",
    description = "Archive a column"
);

impl ArchiveColumn {
    pub fn new(title: impl Into<ColumnTitle>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for ArchiveColumn {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let result = set_column_status(session, &self.title, ColumnStatus::Archived).await;
        conclude(self, start, result)
    }
}

/// Bring an archived column back
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreColumn {
    pub title: ColumnTitle,
}

operation!(
    RestoreColumn,
    verb = "restore",
    noun = "column",
    description = "Restore an archived column"
);

impl RestoreColumn {
    pub fn new(title: impl Into<ColumnTitle>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for RestoreColumn {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let result = set_column_status(session, &self.title, ColumnStatus::Active).await;
        conclude(self, start, result)
    }
}

async fn set_column_status(
    session: &BoardSession,
    title: &ColumnTitle,
    status: ColumnStatus,
) -> Result<Outcome> {
    let state = session.require_initialized()?;
    if state.find_column(title).is_none() {
        return Err(SyncError::ColumnNotFound {
            title: title.to_string(),
        });
    }

    // The options stay as they are; saving keeps the schema in step.
    customize(session, &state.doctype, |_| {}).await?;

    let raw: Vec<RawColumn> = remote::submit(
        session.gateway(),
        method::ARCHIVE_RESTORE_COLUMN,
        &ArchiveRestoreArgs {
            board_name: state.board.name.clone(),
            column_title: title.to_string(),
            status: status.as_str(),
        },
    )
    .await?;

    let columns = prepare_columns(&raw, &session.config().default_indicator);
    let value = serde_json::to_value(&columns)?;
    session.store().replace(StatePatch::new().columns(columns));
    Ok(Outcome::Committed(value))
}
