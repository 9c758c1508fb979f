//! Async access to an [`EasyDb`].
//!
//! [`SharedEasyDb`] keeps the handle behind an `Arc<Mutex<>>` and runs each
//! closure on tokio's blocking pool via `spawn_blocking`, so neither the
//! SQLite calls nor the retry sleeps stall the async runtime. The mutex
//! serialises every call; there is still exactly one connection.

use std::sync::{Arc, Mutex};

use crate::db::EasyDb;
use crate::error::{StoreError, StoreResult};

/// Cloneable, thread-safe wrapper around one [`EasyDb`].
#[derive(Clone, Debug)]
pub struct SharedEasyDb {
    db: Arc<Mutex<EasyDb>>,
}

impl SharedEasyDb {
    pub fn new(db: EasyDb) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run `f` against the database on the blocking pool.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let count = shared.execute(|db| db.record_count("PEOPLE")).await?;
    /// ```
    pub async fn execute<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&EasyDb) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|e| StoreError::TaskJoin(format!("mutex poisoned: {e}")))?;
            f(&db)
        })
        .await?
    }

    /// Take the handle back out, if this is the last clone.
    pub fn try_into_inner(self) -> Result<EasyDb, Self> {
        match Arc::try_unwrap(self.db) {
            Ok(mutex) => mutex
                .into_inner()
                .map_err(|poisoned| Self::new(poisoned.into_inner())),
            Err(db) => Err(Self { db }),
        }
    }
}
