//! The owned database handle.
//!
//! [`EasyDb`] owns exactly one `rusqlite::Connection` for its whole
//! lifetime. The connection is opened by one of the `open*` constructors
//! and closed when the handle is dropped, on every exit path. Table and
//! record operations live in [`crate::table`] and [`crate::record`].

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::{self, EasyDbConfig};
use crate::error::{StoreError, StoreResult};
use crate::retry::RetryPolicy;

/// Handle to one SQLite database file.
///
/// Not shareable across threads; wrap it in
/// [`SharedEasyDb`](crate::SharedEasyDb) for use from async code.
pub struct EasyDb {
    conn: Connection,
    retry: RetryPolicy,
}

impl std::fmt::Debug for EasyDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EasyDb")
            .field("path", &self.conn.path())
            .field("retry", &self.retry)
            .finish()
    }
}

impl EasyDb {
    /// Open (or create) `file_name` inside `folder`.
    ///
    /// With no folder, or an empty one, `file_name` is used as the path.
    pub fn open(file_name: &str, folder: Option<&Path>) -> StoreResult<Self> {
        Self::open_path(config::database_path(file_name, folder), RetryPolicy::default())
    }

    /// Open the database described by `config`.
    pub fn open_with_config(config: &EasyDbConfig) -> StoreResult<Self> {
        let db = Self::open_path(config.database_path(), config.retry)?;
        if let Some(mode) = &config.journal_mode {
            db.retry
                .run(|| db.conn.pragma_update(None, "journal_mode", mode.as_str()))?;
            debug!(journal_mode = %mode, "journal mode set");
        }
        Ok(db)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_path(path: impl AsRef<Path>, retry: RetryPolicy) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;
        Self::prepare_connection(&conn)?;
        Ok(Self { conn, retry })
    }

    /// Create an in-memory database, mostly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("opening in-memory database");

        let conn = Connection::open_in_memory()?;
        Self::prepare_connection(&conn)?;
        Ok(Self {
            conn,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the busy retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Close the connection and report any error from SQLite.
    ///
    /// Dropping the handle also closes it, but swallows the error.
    pub fn close(self) -> StoreResult<()> {
        info!("closing database");
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    /// Borrow the raw connection for anything the facade does not cover.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `op` against the connection under the busy retry policy.
    pub(crate) fn run<T, F>(&self, mut op: F) -> StoreResult<T>
    where
        F: FnMut(&Connection) -> rusqlite::Result<T>,
    {
        self.retry.run(|| op(&self.conn))
    }

    // ── connection setup ─────────────────────────────────────────────

    fn prepare_connection(conn: &Connection) -> StoreResult<()> {
        // Busy handling belongs to RetryPolicy; SQLite must report BUSY at once.
        conn.busy_timeout(Duration::ZERO)?;
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────
