//! INSERT statement generation from catalog metadata.
//!
//! The column list of a table is read from `pragma_table_info` on every
//! call; nothing is cached. The identity column is skipped, so the
//! generated statement has one placeholder per user column, numbered in
//! declared order from `?1`.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::ident;

/// Column names of `table` in declared order, identity column included.
///
/// A table that does not exist yields an empty list.
pub fn field_names(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

/// A parameterized INSERT for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// SQL text with `?1..?N` placeholders.
    pub sql: String,
    /// User columns bound by the placeholders, in order.
    pub columns: Vec<String>,
    /// Total column count of the table, identity column included.
    pub column_count: usize,
}

impl InsertStatement {
    /// Introspect `table` and build its INSERT statement.
    pub fn build(conn: &Connection, table: &str) -> StoreResult<Self> {
        ident::validate(table)?;
        let fields = field_names(conn, table)?;
        Self::from_fields(table, fields)
    }

    /// Build from an already-fetched column list.
    pub fn from_fields(table: &str, fields: Vec<String>) -> StoreResult<Self> {
        if fields.is_empty() {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        let column_count = fields.len();
        let columns: Vec<String> = fields.into_iter().filter(|f| !ident::is_identity(f)).collect();

        let target = ident::quote(table)?;
        let sql = if columns.is_empty() {
            format!("INSERT INTO {target} DEFAULT VALUES")
        } else {
            let names = columns
                .iter()
                .map(|c| ident::quote(c))
                .collect::<StoreResult<Vec<_>>>()?
                .join(", ");
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("INSERT INTO {target} ({names}) VALUES ({placeholders})")
        };

        debug!(table, column_count, sql = %sql, "built insert statement");
        Ok(Self {
            sql,
            columns,
            column_count,
        })
    }

    /// Number of placeholders in [`sql`](Self::sql).
    pub fn placeholder_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEOPLE: &str = "CREATE TABLE PEOPLE (RecordNumber INTEGER NOT NULL PRIMARY KEY, \
                          First TEXT, Last TEXT, Phone TEXT);";

    fn conn_with(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn field_names_in_declared_order() {
        let conn = conn_with(PEOPLE);
        let names = field_names(&conn, "PEOPLE").unwrap();
        assert_eq!(names, ["RecordNumber", "First", "Last", "Phone"]);
    }

    #[test]
    fn field_names_for_missing_table_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(field_names(&conn, "NOPE").unwrap().is_empty());
    }

    #[test]
    fn build_skips_identity_and_numbers_placeholders() {
        let conn = conn_with(PEOPLE);
        let stmt = InsertStatement::build(&conn, "people").unwrap();
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "people" ("First", "Last", "Phone") VALUES (?1, ?2, ?3)"#
        );
        assert_eq!(stmt.column_count, 4);
        assert_eq!(stmt.placeholder_count(), 3);
    }

    #[test]
    fn two_column_table_has_single_placeholder() {
        let conn =
            conn_with("CREATE TABLE T (RecordNumber INTEGER NOT NULL PRIMARY KEY, Only TEXT);");
        let stmt = InsertStatement::build(&conn, "T").unwrap();
        assert_eq!(stmt.sql, r#"INSERT INTO "T" ("Only") VALUES (?1)"#);
        assert_eq!(stmt.column_count, 2);
    }

    #[test]
    fn identity_only_table_uses_default_values() {
        let conn = conn_with("CREATE TABLE T (RecordNumber INTEGER NOT NULL PRIMARY KEY);");
        let stmt = InsertStatement::build(&conn, "T").unwrap();
        assert_eq!(stmt.sql, r#"INSERT INTO "T" DEFAULT VALUES"#);
        conn.execute(&stmt.sql, []).unwrap();
    }

    #[test]
    fn missing_table_fails_explicitly() {
        let conn = Connection::open_in_memory().unwrap();
        let err = InsertStatement::build(&conn, "GHOST").unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(name) if name == "GHOST"));
    }

    #[test]
    fn invalid_table_name_rejected_before_query() {
        let conn = Connection::open_in_memory().unwrap();
        let err = InsertStatement::build(&conn, "x; DROP TABLE y").unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));
    }
}
