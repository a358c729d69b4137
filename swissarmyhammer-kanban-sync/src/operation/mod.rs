//! Operations: mutations as structs whose fields are their parameters.
//!
//! Each mutation implements [`Operation`] for its name and
//! [`Execute`] for its behavior, and reports an [`ExecutionResult`] that says
//! whether the change was confirmed, skipped, rolled back or refused.

mod execution_result;
mod log;

pub use async_trait::async_trait;
pub use execution_result::ExecutionResult;
pub use log::LogEntry;

use crate::error::SyncError;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Name and description of an operation
pub trait Operation {
    fn verb(&self) -> &'static str;
    fn noun(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Canonical op string (e.g. "move card")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run an operation against a context
#[async_trait]
pub trait Execute<C, E>: Operation + Send + Sync
where
    C: Send + Sync,
{
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

/// Implement [`Operation`] for a type
macro_rules! operation {
    ($ty:ty, verb = $verb:literal, noun = $noun:literal, description = $description:literal) => {
        impl $crate::operation::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }

            fn noun(&self) -> &'static str {
                $noun
            }

            fn description(&self) -> &'static str {
                $description
            }
        }
    };
}
pub(crate) use operation;

/// What a successful mutation amounted to
#[derive(Debug)]
pub(crate) enum Outcome {
    /// The remote end confirmed the change
    Committed(Value),
    /// Nothing needed confirming
    Unchanged(Value),
}

/// Turn the body's result into an [`ExecutionResult`] with a journal entry.
///
/// Remote failures become `RolledBack` (the body restored its snapshot
/// before returning); every other error is a `Rejected` precondition.
pub(crate) fn conclude<O>(
    op: &O,
    start: Instant,
    result: Result<Outcome, SyncError>,
) -> ExecutionResult<Value, SyncError>
where
    O: Operation + Serialize,
{
    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(Outcome::Committed(value)) => ExecutionResult::Committed {
            log_entry: LogEntry::new(op.op_string(), input_of(op), value.clone(), duration_ms),
            value,
        },
        Ok(Outcome::Unchanged(value)) => ExecutionResult::Unchanged { value },
        Err(error) if error.is_rollback() => ExecutionResult::RolledBack {
            log_entry: LogEntry::rolled_back(op.op_string(), input_of(op), &error, duration_ms),
            error,
        },
        Err(error) => ExecutionResult::Rejected { error },
    }
}

fn input_of<O: Serialize>(op: &O) -> Value {
    serde_json::to_value(op).unwrap_or(Value::Null)
}
