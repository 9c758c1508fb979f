//! Error types for the easydb-store crate.
//!
//! All operations return [`StoreError`] via [`StoreResult`]. Engine
//! failures pass through as [`StoreError::Sqlite`]; the remaining variants
//! are conditions the wrapper itself detects.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed with a non-transient error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database stayed busy or locked for every retry attempt.
    #[error("database busy after {attempts} attempts")]
    Busy { attempts: u32 },

    /// The table has no columns in the catalog, i.e. it does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A table or column name contains characters outside the allow-list.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// An invalid argument was provided to a store operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A multi-record insert stopped part-way. Earlier records stay committed.
    #[error("batch insert stopped after {inserted} records: {source}")]
    Batch {
        inserted: usize,
        #[source]
        source: Box<StoreError>,
    },

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl StoreError {
    /// Whether this error is the transient busy condition.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
