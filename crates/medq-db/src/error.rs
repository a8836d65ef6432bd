use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity, constraint, or busy-timeout failure reported by SQLite.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Rejected before any connection is opened.
    #[error("message is {len} characters long, limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("unknown user role stored: {0}")]
    UnknownRole(String),

    #[error("unknown message status stored: {0}")]
    UnknownStatus(String),
}
