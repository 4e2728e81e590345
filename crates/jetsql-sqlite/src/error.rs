//! Error types for statement execution.

use jetsql_core::BuildError;

/// Errors raised while executing a statement.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The statement could not be rendered.
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for execution.
pub type Result<T> = std::result::Result<T, ExecError>;
