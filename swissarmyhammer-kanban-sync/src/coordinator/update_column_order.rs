//! UpdateColumnOrder command

use crate::error::{Result, SyncError};
use crate::operation::{async_trait, conclude, operation, Execute, ExecutionResult, Outcome};
use crate::ordering::prepare_columns;
use crate::remote::{self, method, UpdateColumnOrderArgs};
use crate::session::BoardSession;
use crate::types::{BoardRecord, ColumnTitle, StatePatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Instant;

/// Submit a new column sequence; the server's canonical list replaces the
/// local columns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateColumnOrder {
    pub order: Vec<ColumnTitle>,
}

operation!(
    UpdateColumnOrder,
    verb = "update",
    noun = "column order",
    description = "Change the order of the board's columns"
);

impl UpdateColumnOrder {
    pub fn new<I, T>(order: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ColumnTitle>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Outcome> {
        let state = session.require_initialized()?;
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.order.iter().find(|title| !seen.insert(*title)) {
            return Err(SyncError::invalid_value(
                "order",
                format!("column {duplicate} listed twice"),
            ));
        }

        let board: BoardRecord = remote::submit(
            session.gateway(),
            method::UPDATE_COLUMN_ORDER,
            &UpdateColumnOrderArgs {
                board_name: state.board.name.clone(),
                order: &self.order,
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
impl Execute<BoardSession, SyncError> for UpdateColumnOrder {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        conclude(self, start, self.run(session).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardSyncConfig;
    use crate::error::RemoteError;
    use crate::test_support::{sample_board, ScriptedGateway, StaticCapabilities};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_columns_replaced_from_server() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.reply(
            method::UPDATE_COLUMN_ORDER,
            json!({"name": "Workshop", "field_name": "status", "columns": [
                {"column_name": "Quoted"}, {"column_name": "In queue"}
            ]}),
        );
        let session = BoardSession::new(
            gateway.clone(),
            Arc::new(StaticCapabilities::allow_all()),
            BoardSyncConfig::default(),
        );
        session.init(sample_board()).unwrap();

        session
            .dispatch(&UpdateColumnOrder::new(["Quoted", "In queue"]))
            .await
            .unwrap();

        assert_eq!(
            gateway.calls_to(method::UPDATE_COLUMN_ORDER)[0]["order"],
            json!(["Quoted", "In queue"])
        );
        let titles: Vec<_> = session
            .state()
            .columns
            .iter()
            .map(|c| c.title.to_string())
            .collect();
        assert_eq!(titles, vec!["Quoted", "In queue"]);
    }

    #[tokio::test]
    async fn test_duplicate_titles_rejected() {
        let gateway = Arc::new(ScriptedGateway::new());
        let session = BoardSession::new(
            gateway.clone(),
            Arc::new(StaticCapabilities::allow_all()),
            BoardSyncConfig::default(),
        );
        session.init(sample_board()).unwrap();

        let err = session
            .dispatch(&UpdateColumnOrder::new(["Quoted", "Quoted"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidValue { .. }));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_column_order_keeps_columns() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.fail(
            method::UPDATE_COLUMN_ORDER,
            RemoteError::transport(method::UPDATE_COLUMN_ORDER, "timeout"),
        );
        let session = BoardSession::new(
            gateway.clone(),
            Arc::new(StaticCapabilities::allow_all()),
            BoardSyncConfig::default(),
        );
        session.init(sample_board()).unwrap();
        let before = session.state();

        let err = session
            .dispatch(&UpdateColumnOrder::new(["Quoted", "In queue"]))
            .await
            .unwrap_err();
        assert!(err.is_rollback());
        assert_eq!(*session.state().columns, *before.columns);
        let entry = &session.activity()[0];
        assert_eq!(entry.op, "update column order");
        assert!(entry.rolled_back);
    }
}
