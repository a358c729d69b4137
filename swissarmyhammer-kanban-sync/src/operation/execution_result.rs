//! Execution result types for operations

use super::LogEntry;

/// Result of executing a mutation
///
/// Distinguishes between:
/// - Committed: the remote end confirmed, state holds the server's truth
/// - Unchanged: nothing to confirm (no-op or read)
/// - RolledBack: the remote end failed, the snapshot was restored
/// - Rejected: a precondition failed before any state changed
pub enum ExecutionResult<T, E> {
    Committed { value: T, log_entry: LogEntry },
    Unchanged { value: T },
    RolledBack { error: E, log_entry: LogEntry },
    Rejected { error: E },
}

impl<T, E> ExecutionResult<T, E> {
    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Committed { value, .. } | Self::Unchanged { value } => Ok(value),
            Self::RolledBack { error, .. } | Self::Rejected { error } => Err(error),
        }
    }

    /// Get the value and log entry separately
    pub fn split(self) -> (Result<T, E>, Option<LogEntry>) {
        match self {
            Self::Committed { value, log_entry } => (Ok(value), Some(log_entry)),
            Self::Unchanged { value } => (Ok(value), None),
            Self::RolledBack { error, log_entry } => (Err(error), Some(log_entry)),
            Self::Rejected { error } => (Err(error), None),
        }
    }

    /// Check if this should be journaled
    pub fn should_log(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::RolledBack { .. })
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack { .. })
    }
}
