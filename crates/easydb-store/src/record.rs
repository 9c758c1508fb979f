//! Record insertion, lookup and deletion.
//!
//! Values are bound positionally against the table's user columns in
//! declared order. An empty string is stored as NULL, and so is any
//! trailing column the caller did not supply; once stored, "empty" and
//! "absent" cannot be told apart.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use tracing::{debug, instrument, warn};

use crate::db::EasyDb;
use crate::error::{StoreError, StoreResult};
use crate::ident::{self, IDENTITY_COLUMN};
use crate::predicate::Predicate;
use crate::statement::InsertStatement;

/// One stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Value of the identity column.
    pub record_number: i64,
    /// User columns in declared order; `None` for NULL.
    pub fields: Vec<Option<String>>,
}

impl Record {
    /// Field at `index`, flattening NULL to `None`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|v| v.as_deref())
    }

    /// Fields with NULL rendered as the empty string.
    pub fn to_strings(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|v| v.clone().unwrap_or_default())
            .collect()
    }
}

impl EasyDb {
    /// Insert one record and return its `RecordNumber`.
    ///
    /// Fails with [`StoreError::TableNotFound`] if the table does not exist
    /// and with [`StoreError::InvalidArgument`] if `values` has more entries
    /// than the table has user columns.
    #[instrument(skip(self, values), fields(values = values.len()))]
    pub fn add_record<S: AsRef<str>>(&self, table: &str, values: &[S]) -> StoreResult<i64> {
        let stmt = InsertStatement::from_fields(table, self.field_names(table)?)?;
        if values.len() > stmt.placeholder_count() {
            return Err(StoreError::InvalidArgument(format!(
                "{} values for {} columns of {table}",
                values.len(),
                stmt.placeholder_count()
            )));
        }

        let bound: Vec<Value> = (0..stmt.placeholder_count())
            .map(|i| match values.get(i).map(AsRef::as_ref) {
                None | Some("") => Value::Null,
                Some(v) => Value::Text(v.to_string()),
            })
            .collect();

        let id = self.run(|conn| {
            let mut prepared = conn.prepare(&stmt.sql)?;
            prepared.execute(params_from_iter(bound.iter()))?;
            Ok(conn.last_insert_rowid())
        })?;
        debug!(table, record_number = id, "record added");
        Ok(id)
    }

    /// Insert each record in turn, without an enclosing transaction.
    ///
    /// The first failure stops the batch with [`StoreError::Batch`]; records
    /// inserted before it remain committed.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn add_records<R, S>(&self, table: &str, records: &[R]) -> StoreResult<Vec<i64>>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            match self.add_record(table, record.as_ref()) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    warn!(table, inserted = ids.len(), error = %err, "batch insert stopped");
                    return Err(StoreError::Batch {
                        inserted: ids.len(),
                        source: Box::new(err),
                    });
                }
            }
        }
        Ok(ids)
    }

    /// Every record of `table` in engine scan order.
    pub fn records(&self, table: &str) -> StoreResult<Vec<Record>> {
        self.find_records(table, &Predicate::all())
    }

    /// Records matching `predicate`.
    #[instrument(skip(self))]
    pub fn find_records(&self, table: &str, predicate: &Predicate) -> StoreResult<Vec<Record>> {
        let rendered = predicate.render()?;
        let sql = format!("SELECT * FROM {}{}", ident::quote(table)?, rendered.sql);
        self.run(|conn| select(conn, &sql, &rendered.params))
    }

    /// First record matching `predicate`, if any.
    pub fn find_record(&self, table: &str, predicate: &Predicate) -> StoreResult<Option<Record>> {
        let limited = predicate.clone().limit(1);
        Ok(self.find_records(table, &limited)?.into_iter().next())
    }

    /// The record whose identity equals `record_number`.
    pub fn record_at(&self, table: &str, record_number: i64) -> StoreResult<Option<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {IDENTITY_COLUMN} = ?1",
            ident::quote(table)?
        );
        self.run(|conn| conn.query_row(&sql, [record_number], read_record).optional())
    }

    /// Number of rows in `table`.
    pub fn record_count(&self, table: &str) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", ident::quote(table)?);
        let count: i64 = self.run(|conn| conn.query_row(&sql, [], |row| row.get(0)))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Delete every row and return how many were removed.
    pub fn delete_records(&self, table: &str) -> StoreResult<usize> {
        self.delete_where(table, &Predicate::all())
    }

    /// Delete rows matching `predicate` and return how many were removed.
    #[instrument(skip(self))]
    pub fn delete_where(&self, table: &str, predicate: &Predicate) -> StoreResult<usize> {
        let rendered = predicate.render_filter()?;
        let sql = format!("DELETE FROM {}{}", ident::quote(table)?, rendered.sql);
        let removed =
            self.run(|conn| conn.execute(&sql, params_from_iter(rendered.params.iter())))?;
        debug!(table, removed, "records deleted");
        Ok(removed)
    }
}

fn select(conn: &Connection, sql: &str, params: &[String]) -> rusqlite::Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), read_record)?;
    rows.collect()
}

/// Map a `SELECT *` row: identity first, then the user columns.
fn read_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    let width = row.as_ref().column_count();
    let record_number = row.get(0)?;
    let fields = (1..width)
        .map(|i| row.get::<_, Option<String>>(i))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Record {
        record_number,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> EasyDb {
        let db = EasyDb::open_in_memory().unwrap();
        db.create_table_default("People", &["First", "Last", "Country"])
            .unwrap();
        db
    }

    #[test]
    fn add_record_returns_sequential_ids() {
        let db = people();
        assert_eq!(db.add_record("People", &["Ann", "Lee", "USA"]).unwrap(), 1);
        assert_eq!(db.add_record("People", &["Bob", "Ray", "UK"]).unwrap(), 2);
        assert_eq!(db.record_count("People").unwrap(), 2);
    }

    #[test]
    fn short_record_stores_null_not_empty_text() {
        let db = people();
        let id = db.add_record("People", &["Ann", "Lee"]).unwrap();
        let rec = db.record_at("People", id).unwrap().unwrap();
        assert_eq!(
            rec.fields,
            [Some("Ann".to_string()), Some("Lee".to_string()), None]
        );

        let nulls: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM People WHERE Country IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn empty_string_is_stored_as_null() {
        let db = people();
        let id = db.add_record("People", &["", "Lee", "USA"]).unwrap();
        let rec = db.record_at("People", id).unwrap().unwrap();
        assert_eq!(rec.get(0), None);
        assert_eq!(rec.to_strings(), ["", "Lee", "USA"]);
    }

    #[test]
    fn too_many_values_is_rejected() {
        let db = people();
        let err = db.add_record("People", &["a", "b", "c", "d"]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
        assert_eq!(db.record_count("People").unwrap(), 0);
    }

    #[test]
    fn add_record_on_missing_table_fails() {
        let db = EasyDb::open_in_memory().unwrap();
        let err = db.add_record("Ghost", &["x"]).unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }

    #[test]
    fn add_records_inserts_all() {
        let db = people();
        let ids = db
            .add_records(
                "People",
                &[
                    vec!["Jason", "Peek", "USA"],
                    vec!["Walter", "Perry", "USA"],
                    vec!["Jay", "Pearson", "USA"],
                ],
            )
            .unwrap();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(db.records("People").unwrap().len(), 3);
    }

    #[test]
    fn add_records_keeps_prefix_on_failure() {
        let db = people();
        let err = db
            .add_records(
                "People",
                &[
                    vec!["a", "b", "c"],
                    vec!["a", "b", "c", "too many"],
                    vec!["x", "y", "z"],
                ],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Batch { inserted: 1, .. }));
        assert_eq!(db.record_count("People").unwrap(), 1);
    }

    #[test]
    fn find_records_filters_and_orders() {
        let db = people();
        db.add_records(
            "People",
            &[
                vec!["Jason", "Peek", "USA"],
                vec!["Walter", "Perry", "USA"],
                vec!["Jay", "Pearson", "UK"],
            ],
        )
        .unwrap();

        let usa = db
            .find_records(
                "People",
                &Predicate::eq("Country", "USA")
                    .order_by("First", crate::SortOrder::Descending),
            )
            .unwrap();
        let firsts: Vec<_> = usa.iter().map(|r| r.get(0).unwrap()).collect();
        assert_eq!(firsts, ["Walter", "Jason"]);

        let j = db
            .find_record("People", &Predicate::all().and_like("First", "Ja%"))
            .unwrap()
            .unwrap();
        assert_eq!(j.get(1), Some("Peek"));

        assert!(
            db.find_record("People", &Predicate::eq("First", "Nobody"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn record_at_missing_is_none() {
        let db = people();
        db.add_record("People", &["a"]).unwrap();
        assert!(db.record_at("People", 1).unwrap().is_some());
        assert!(db.record_at("People", 99).unwrap().is_none());
    }

    #[test]
    fn delete_where_removes_matches_only() {
        let db = people();
        db.add_records(
            "People",
            &[vec!["a", "Valverde"], vec!["b", "Perry"], vec!["c", "Valverde"]],
        )
        .unwrap();
        let removed = db
            .delete_where("People", &Predicate::eq("Last", "Valverde"))
            .unwrap();
        assert_eq!(removed, 2);
        let left = db.records("People").unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].record_number, 2);
    }

    #[test]
    fn delete_records_on_empty_table_succeeds() {
        let db = people();
        assert_eq!(db.delete_records("People").unwrap(), 0);
        assert_eq!(db.record_count("People").unwrap(), 0);
    }

    #[test]
    fn added_column_is_picked_up_by_insert() {
        let db = people();
        db.add_column("People", "Phone").unwrap();
        let id = db
            .add_record("People", &["Ann", "Lee", "USA", "555-0100"])
            .unwrap();
        let rec = db.record_at("People", id).unwrap().unwrap();
        assert_eq!(rec.get(3), Some("555-0100"));
    }
}
