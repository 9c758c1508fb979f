//! # easydb-store
//!
//! A small record-table layer over SQLite.
//!
//! Every table follows one convention: an engine-managed integer identity
//! column `RecordNumber` plus any number of TEXT columns. On top of that the
//! crate offers table lifecycle, record insert / query / delete, and
//! single-column indexes, each executed as one statement under a bounded
//! busy-retry policy.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  SharedEasyDb (Arc<Mutex>, spawn_blocking)  │
//! ├─────────────────────────────────────────────┤
//! │  EasyDb facade: tables, records, indexes    │
//! │  Predicate (typed WHERE / ORDER / LIMIT)    │
//! │  InsertStatement (catalog introspection)    │
//! ├─────────────────────────────────────────────┤
//! │  RetryPolicy (busy / locked retries)        │
//! │  rusqlite::Connection (one, owned)          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use easydb_store::{EasyDb, Predicate};
//!
//! let db = EasyDb::open("contacts.db", Some(Path::new("data")))?;
//! db.create_table_default("Contacts", &["FirstName", "LastName", "Phone"])?;
//! db.add_record("Contacts", &["Michael", "Valverde", "555-0100"])?;
//! let found = db.find_records("Contacts", &Predicate::eq("FirstName", "Michael"))?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod ident;
pub mod predicate;
pub mod record;
pub mod retry;
pub mod shared;
pub mod statement;
pub mod table;

// ── re-exports ───────────────────────────────────────────────────────

pub use config::EasyDbConfig;
pub use db::EasyDb;
pub use error::{StoreError, StoreResult};
pub use ident::IDENTITY_COLUMN;
pub use predicate::{Condition, Predicate, SortOrder};
pub use record::Record;
pub use retry::RetryPolicy;
pub use shared::SharedEasyDb;
pub use statement::InsertStatement;
