//! Error type shared by the board, the store and the summary client.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Task {0} not found")]
    NotFound(u64),

    #[error("Unknown category '{0}'. Run `drillboard categories` to see the known set.")]
    InvalidCategory(String),

    #[error("Invalid status '{0}'. Use pending, in-progress or done.")]
    InvalidStatus(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Stored snapshot could not be parsed. Callers recover with an empty list.
    #[error("Could not read saved tasks: {0}")]
    PersistenceRead(String),

    /// Carries the user-facing message to show instead of a summary.
    #[error("{0}")]
    SummaryService(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type BoardResult<T> = Result<T, BoardError>;
