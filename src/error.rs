//! Error types for qlens.
//!
//! Every failure an operation can surface to its caller is represented
//! here, with a stable code the external workflow scheduler can parse
//! to decide whether to re-invoke.

use thiserror::Error;

use crate::workflow::Status;

/// Result type alias for qlens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// qlens error types.
///
/// Each variant includes a code callers can match programmatically.
#[derive(Error, Debug)]
pub enum Error {
    /// The instance is not in the status the operation requires.
    /// No remote mutation was attempted.
    #[error("Operation '{operation}' requires status {required}, instance {instance_id} is {actual}")]
    Precondition {
        operation: &'static str,
        instance_id: String,
        required: &'static str,
        actual: Status,
    },

    /// No instance exists under the given id. Absence of a row is data,
    /// not an exception; this is built from the store's `None`.
    #[error("No provision instance found for id '{0}'")]
    InstanceNotFound(String),

    /// A transition was requested from a status it does not start in.
    #[error("Transition '{transition}' cannot be applied from status {from}")]
    Transition {
        transition: &'static str,
        from: Status,
    },

    /// The remote element rejected or failed a query or mutation.
    #[error("Remote element error: {0}")]
    Remote(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error code for caller-side matching.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Precondition { .. } => "PRECONDITION_FAILED",
            Error::InstanceNotFound(_) => "INSTANCE_NOT_FOUND",
            Error::Transition { .. } => "INVALID_TRANSITION",
            Error::Remote(_) => "REMOTE_ERROR",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// Whether re-invoking the same operation can make progress.
    ///
    /// Precondition and validation failures need caller intervention;
    /// remote and storage failures are worth a retry once the fault
    /// clears, relying on the already-exists / already-absent checks
    /// to keep the retry idempotent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Remote(_) | Error::Storage(_) | Error::Database(_) | Error::Io(_)
        )
    }
}
