//! Basics / fields / meta stores (SQLite).
//!
//! Each store persists one table and delegates the rows it owns to the store
//! below it: basics → fields → metas. Every operation takes the connection
//! explicitly and runs inside its own transaction, which nests as a savepoint
//! when the caller (usually [`crate::facade::ConfigsFacade`]) already opened one.
//!
//! Missing rows are never errors: reads return `None` or an empty list, writes
//! return `0` rows affected.
use std::path::PathBuf;

use diesel::SqliteConnection;

use crate::configs::{BasicsConfig, FieldsConfig, MetasConfig};

pub mod basics;
pub mod fields;
pub mod meta;

pub use basics::SqliteBasicsStore;
pub use fields::SqliteFieldsStore;
pub use meta::SqliteMetaStore;

#[derive(thiserror::Error, Debug)]
/// Storage-class failures. Propagated unchanged; the enclosing transaction rolls back.
pub enum StoreError {
    /// A statement failed (I/O error, lock timeout, constraint violation, ...).
    #[error("storage failure: {0}")]
    Storage(#[from] diesel::result::Error),
    /// A database file could not be opened, tuned, or migrated.
    #[error("failed to open database {path}: {message}")]
    Open {
        /// Database file.
        path: PathBuf,
        /// Rendered cause chain.
        message: String,
    },
    /// A thread panicked while holding the connection.
    #[error("database handle is poisoned")]
    Poisoned,
    /// Filesystem error while managing database files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the stores.
pub type StoreResult<T> = Result<T, StoreError>;

/// Recursive key/value trees scoped by an owner key (`quote_id`).
pub trait MetaStore {
    /// Writes `nodes` and all their descendants under `owner_id`. Returns rows written.
    ///
    /// Nodes without a `meta_id` get a fresh one; every row gets `quote_id = owner_id`.
    fn write_tree(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        nodes: &[MetasConfig],
    ) -> StoreResult<usize>;

    /// Reads every tree owned by `owner_id`, fully nested, siblings in write order.
    fn read_tree(&self, conn: &mut SqliteConnection, owner_id: &str)
    -> StoreResult<Vec<MetasConfig>>;

    /// Reads only the root nodes owned by `owner_id`; their `meta_list` is left empty.
    fn read_roots(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
    ) -> StoreResult<Vec<MetasConfig>>;

    /// Deletes every node owned by `owner_id` at every depth. Returns rows removed.
    fn delete_tree(&self, conn: &mut SqliteConnection, owner_id: &str) -> StoreResult<usize>;
}

/// The optional field mapping attached to a basics row.
pub trait FieldsStore {
    /// Inserts the row and its meta trees.
    fn insert(&self, conn: &mut SqliteConnection, fields: &FieldsConfig) -> StoreResult<()>;

    /// Loads the row and its meta trees.
    fn get_by_id(
        &self,
        conn: &mut SqliteConnection,
        field_id: &str,
    ) -> StoreResult<Option<FieldsConfig>>;

    /// Updates scalars and rewrites the meta trees. Returns rows affected (0 if unknown).
    fn update(&self, conn: &mut SqliteConnection, fields: &FieldsConfig) -> StoreResult<usize>;

    /// Deletes the meta trees and the row. Returns rows affected.
    fn delete(&self, conn: &mut SqliteConnection, field_id: &str) -> StoreResult<usize>;
}

/// Root configuration rows and everything they own.
pub trait BasicsStore {
    /// Inserts the aggregate: fields row, basics row, meta trees.
    fn insert(&self, conn: &mut SqliteConnection, basics: &BasicsConfig) -> StoreResult<()>;

    /// Loads one fully hydrated aggregate.
    fn get_by_id(
        &self,
        conn: &mut SqliteConnection,
        basic_id: &str,
    ) -> StoreResult<Option<BasicsConfig>>;

    /// Loads every aggregate in insertion order.
    fn get_all(&self, conn: &mut SqliteConnection) -> StoreResult<Vec<BasicsConfig>>;

    /// Replaces scalars and meta trees and reconciles the fields row. Returns rows affected.
    fn update(&self, conn: &mut SqliteConnection, basics: &BasicsConfig) -> StoreResult<usize>;

    /// Deletes the aggregate with everything it owns. Returns rows affected.
    fn delete(&self, conn: &mut SqliteConnection, basic_id: &str) -> StoreResult<usize>;
}
