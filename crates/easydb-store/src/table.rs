//! Table lifecycle and single-column index management.

use std::collections::HashSet;

use rusqlite::OptionalExtension;
use tracing::{debug, info, instrument};

use crate::db::EasyDb;
use crate::error::{StoreError, StoreResult};
use crate::ident::{self, IDENTITY_COLUMN};
use crate::predicate::SortOrder;
use crate::statement;

impl EasyDb {
    /// Whether a table named `name` exists, ignoring case.
    #[instrument(skip(self))]
    pub fn table_exists(&self, name: &str) -> StoreResult<bool> {
        let found = self.run(|conn| {
            conn.query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                [name],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })?;
        Ok(found.is_some())
    }

    /// Create table `NAME` (uppercased) with the identity column plus one
    /// TEXT column per entry of `fields`.
    ///
    /// With `overwrite` any same-named table is dropped first, discarding its
    /// rows. Without it an existing table is left alone and `false` is
    /// returned. Returns `true` when a table was created.
    #[instrument(skip(self, fields))]
    pub fn create_table<S: AsRef<str>>(
        &self,
        name: &str,
        fields: &[S],
        overwrite: bool,
    ) -> StoreResult<bool> {
        ident::validate(name)?;
        let mut seen = HashSet::with_capacity(fields.len());
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            let field = field.as_ref();
            if ident::is_identity(field) {
                return Err(StoreError::InvalidArgument(format!(
                    "{field} is reserved for the identity column"
                )));
            }
            if !seen.insert(field.to_ascii_lowercase()) {
                return Err(StoreError::InvalidArgument(format!("duplicate column {field}")));
            }
            columns.push(format!("{} TEXT", ident::quote(field)?));
        }

        if !overwrite && self.table_exists(name)? {
            debug!(table = name, "table exists, keeping it");
            return Ok(false);
        }

        let table = ident::quote(&name.to_ascii_uppercase())?;
        let drop_sql = format!("DROP TABLE IF EXISTS {table}");
        let mut create_sql =
            format!("CREATE TABLE {table} ({IDENTITY_COLUMN} INTEGER NOT NULL PRIMARY KEY");
        for column in &columns {
            create_sql.push_str(", ");
            create_sql.push_str(column);
        }
        create_sql.push(')');

        // Drop and create commit together; a failed create keeps the old table.
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(&drop_sql, [])?;
            tx.execute(&create_sql, [])?;
            tx.commit()
        })?;
        info!(table = %table, columns = columns.len(), "table created");
        Ok(true)
    }

    /// [`create_table`](Self::create_table) with `overwrite = true`.
    pub fn create_table_default<S: AsRef<str>>(
        &self,
        name: &str,
        fields: &[S],
    ) -> StoreResult<bool> {
        self.create_table(name, fields, true)
    }

    /// Drop `name`. Dropping a missing table is an engine error.
    #[instrument(skip(self))]
    pub fn drop_table(&self, name: &str) -> StoreResult<()> {
        let sql = format!("DROP TABLE {}", ident::quote(name)?);
        self.run(|conn| conn.execute(&sql, []))?;
        info!(table = name, "table dropped");
        Ok(())
    }

    /// Append a TEXT column. Returns `false` without touching anything when
    /// the table does not exist.
    #[instrument(skip(self))]
    pub fn add_column(&self, table: &str, column: &str) -> StoreResult<bool> {
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} TEXT",
            ident::quote(table)?,
            ident::quote(column)?
        );
        if !self.table_exists(table)? {
            debug!(table, "add_column on missing table ignored");
            return Ok(false);
        }
        self.run(|conn| conn.execute(&sql, []))?;
        Ok(true)
    }

    /// Column names in declared order, identity column first. Empty for a
    /// missing table.
    pub fn field_names(&self, table: &str) -> StoreResult<Vec<String>> {
        ident::validate(table)?;
        self.run(|conn| statement::field_names(conn, table))
    }

    /// Total column count including the identity column; `0` for a missing
    /// table.
    pub fn column_count(&self, table: &str) -> StoreResult<usize> {
        Ok(self.field_names(table)?.len())
    }

    /// Create index `IDX_<TABLE>_<COLUMN>` on one column and return its name.
    #[instrument(skip(self))]
    pub fn add_index(&self, table: &str, column: &str, order: SortOrder) -> StoreResult<String> {
        let index = ident::index_name(table, column)?;
        let sql = format!(
            "CREATE INDEX {} ON {} ({} {})",
            ident::quote(&index)?,
            ident::quote(table)?,
            ident::quote(column)?,
            order.as_sql()
        );
        self.run(|conn| conn.execute(&sql, []))?;
        debug!(index = %index, "index created");
        Ok(index)
    }

    /// Drop the index created by [`add_index`](Self::add_index) for this
    /// table and column.
    #[instrument(skip(self))]
    pub fn drop_index(&self, table: &str, column: &str) -> StoreResult<()> {
        let index = ident::index_name(table, column)?;
        let sql = format!("DROP INDEX {}", ident::quote(&index)?);
        self.run(|conn| conn.execute(&sql, []))?;
        debug!(index = %index, "index dropped");
        Ok(())
    }
}
