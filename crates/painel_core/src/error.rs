use thiserror::Error;

/// Error taxonomy for everything the explorer touches.
///
/// `Configuration` is fatal to all downstream operations until fixed
/// externally; every other variant is scoped to the operation that
/// produced it and leaves the session usable.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Schema introspection failed: {0}")]
    Schema(String),

    #[error("Query failed: {0}")]
    QueryExecution(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Whether the session can continue after this error by adjusting
    /// the current selection and retrying.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DbError::Configuration(_))
    }
}
