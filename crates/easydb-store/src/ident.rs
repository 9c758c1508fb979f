//! Identifier validation.
//!
//! Table and column names cannot be bound as parameters, so every name that
//! reaches a SQL string passes through [`validate`] first and is emitted
//! double-quoted by [`quote`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{StoreError, StoreResult};

/// Name of the engine-managed identity column present in every table.
pub const IDENTITY_COLUMN: &str = "RecordNumber";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"));

/// Check that `name` is a plain SQL identifier.
pub fn validate(name: &str) -> StoreResult<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate `name` and wrap it in double quotes.
pub fn quote(name: &str) -> StoreResult<String> {
    validate(name).map(|n| format!("\"{n}\""))
}

/// Whether `name` refers to the identity column (case-insensitive).
pub fn is_identity(name: &str) -> bool {
    name.eq_ignore_ascii_case(IDENTITY_COLUMN)
}

/// Deterministic index name for a single-column index.
pub fn index_name(table: &str, column: &str) -> StoreResult<String> {
    validate(table)?;
    validate(column)?;
    Ok(format!(
        "IDX_{}_{}",
        table.to_ascii_uppercase(),
        column.to_ascii_uppercase()
    ))
}
