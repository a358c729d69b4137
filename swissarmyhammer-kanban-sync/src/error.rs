//! Error types for the board synchronization engine

use thiserror::Error;

/// Result type for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Message shown for every failure that is not a permission problem.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Failures reported by a remote gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote end processed the call and refused it
    #[error("{method} rejected: {message}")]
    Rejected { method: String, message: String },

    /// The call never produced a response
    #[error("{method} failed in transport: {message}")]
    Transport { method: String, message: String },
}

impl RemoteError {
    /// Create a rejection for the given method
    pub fn rejected(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create a transport failure for the given method
    pub fn transport(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            method: method.into(),
            message: message.into(),
        }
    }

    /// The remote method that failed
    pub fn method(&self) -> &str {
        match self {
            Self::Rejected { method, .. } | Self::Transport { method, .. } => method,
        }
    }
}

/// Errors that can occur while synchronizing a board
#[derive(Debug, Error)]
pub enum SyncError {
    /// Capability check failed before the mutation was attempted
    #[error("not permitted: {message}")]
    PermissionDenied { message: String },

    /// A card move is already waiting for confirmation
    #[error("board is frozen while a card move is being confirmed")]
    Frozen,

    /// The session has no board loaded
    #[error("board session is not initialized")]
    NotInitialized,

    /// Card not present in the store
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Column not present in the store
    #[error("column not found: {title}")]
    ColumnNotFound { title: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Remote confirmation failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Remote reply did not have the expected shape
    #[error("unexpected reply from {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl SyncError {
    /// Create a permission error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a remote reply
    pub fn decode(method: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            method: method.into(),
            source,
        }
    }

    /// Whether this error came back from the remote end, which means the
    /// coordinator restored its snapshot.
    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Decode { .. })
    }

    /// The text a user is allowed to see for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied { message } => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<figment::Error> for SyncError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
