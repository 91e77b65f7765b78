//! Custom error types for the engine.

use thiserror::Error;

/// Engine errors surfaced to the UI layer.
///
/// Local read/write problems after startup are deliberately absent: the
/// storage layer logs and swallows them so one bad day's data never blocks
/// the rest of the app.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("remote error: {0}")]
    Remote(#[from] nutrilog_client::RemoteError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not authenticated")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;
