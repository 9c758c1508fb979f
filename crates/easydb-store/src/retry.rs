//! Bounded retry for transient busy/locked conditions.
//!
//! SQLite reports `SQLITE_BUSY` (or `SQLITE_LOCKED`) when another
//! connection holds a conflicting lock. [`RetryPolicy::run`] re-runs the
//! operation a fixed number of times with a fixed blocking sleep in
//! between. There is no backoff growth and no cancellation: a caller is
//! stalled for at most `(max_attempts - 1) * delay` plus the time spent in
//! the attempts themselves.

use std::time::Duration;

use rusqlite::ErrorCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Default number of attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default sleep between attempts, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 100;

/// Attempt count and inter-attempt delay for busy retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `0` behaves like `1`.
    pub max_attempts: u32,
    /// Blocking sleep between attempts.
    #[serde(rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are used up.
    pub fn run<T, F>(&self, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> rusqlite::Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if is_transient(&err) => {
                    if attempt == attempts {
                        break;
                    }
                    debug!(attempt, max_attempts = attempts, "database busy, retrying");
                    std::thread::sleep(self.delay);
                }
                Err(err) => return Err(err.into()),
            }
        }
        warn!(attempts, "database still busy, giving up");
        Err(StoreError::Busy { attempts })
    }
}

/// Whether `err` is SQLite's busy or locked status.
pub fn is_transient(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
