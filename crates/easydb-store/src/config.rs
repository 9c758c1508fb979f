//! Database location and retry configuration.
//!
//! Configuration is plain data that can be built in code or read from a
//! TOML file:
//!
//! ```toml
//! folder = "/var/lib/app"
//! file_name = "contacts.db"
//! journal_mode = "WAL"
//!
//! [retry]
//! max_attempts = 10
//! delay_ms = 100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::retry::RetryPolicy;

/// Default database file name when none is configured.
pub const DEFAULT_FILE_NAME: &str = "easydb.db";

/// Configuration for opening an [`EasyDb`](crate::EasyDb).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasyDbConfig {
    /// Directory holding the database file. `None` or empty means the
    /// file name is used as given.
    pub folder: Option<PathBuf>,
    /// Database file name, joined onto `folder`.
    pub file_name: String,
    /// Busy retry behaviour for every statement.
    pub retry: RetryPolicy,
    /// Optional `journal_mode` pragma (`DELETE`, `WAL`, ...).
    pub journal_mode: Option<String>,
}

impl Default for EasyDbConfig {
    fn default() -> Self {
        Self {
            folder: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            retry: RetryPolicy::default(),
            journal_mode: None,
        }
    }
}

impl EasyDbConfig {
    /// Config for `file_name` inside `folder`, everything else default.
    pub fn new(file_name: impl Into<String>, folder: Option<PathBuf>) -> Self {
        Self {
            folder,
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_journal_mode(mut self, mode: impl Into<String>) -> Self {
        self.journal_mode = Some(mode.into());
        self
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading easydb config");
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        database_path(&self.file_name, self.folder.as_deref())
    }
}

/// `folder/file_name`, or `file_name` alone when `folder` is absent or empty.
pub fn database_path(file_name: &str, folder: Option<&Path>) -> PathBuf {
    match folder {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
