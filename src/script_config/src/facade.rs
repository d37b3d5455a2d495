//! Single entry point for reading and writing configuration aggregates.
//!
//! ## Transactions
//! Every write runs inside one **`BEGIN IMMEDIATE`** transaction via
//! `SqliteConnection::immediate_transaction`: the basics row, the fields row and
//! every meta tree either all land or none do. The stores open their own
//! transactions too; under the façade those become savepoints. Reads run in a
//! deferred transaction so a hydrated aggregate comes from one snapshot.
//!
//! ## Locking
//! The façade holds a [`DbHandle`] and locks it for the duration of one call.
//! Calls are blocking; run them off latency-sensitive threads.
//!
//! Example:
//! ```no_run
//! use script_config::configs::{BasicsConfig, MetasConfig};
//! use script_config::db::ScriptDbRegistry;
//! use script_config::settings::StoreSettings;
//!
//! let registry = ScriptDbRegistry::new(StoreSettings::new("/tmp/scripts"));
//! let facade = registry.facade("hacker-news").expect("open");
//!
//! let mut cfg = BasicsConfig::new("hacker-news", "https://hn.example/api", "items");
//! cfg.meta_list.push(MetasConfig::new("lang", Some("en".into())));
//! facade.insert(&cfg).expect("insert");
//! assert!(facade.get_by_id(&cfg.basic_id).expect("read").is_some());
//! ```

use diesel::{Connection, SqliteConnection};
use tracing::info;

use crate::configs::{BasicsConfig, FieldsConfig, MetasConfig};
use crate::db::DbHandle;
use crate::store::{
    BasicsStore, FieldsStore, MetaStore, SqliteBasicsStore, SqliteFieldsStore, SqliteMetaStore,
    StoreError, StoreResult,
};

/// Aggregate-level API over one script database.
#[derive(Clone)]
pub struct ConfigsFacade {
    handle: DbHandle,
    basics: SqliteBasicsStore,
    fields: SqliteFieldsStore,
    metas: SqliteMetaStore,
}

impl ConfigsFacade {
    /// Wraps an open, migrated database handle.
    pub fn new(handle: DbHandle) -> Self {
        Self {
            handle,
            basics: SqliteBasicsStore::new(),
            fields: SqliteFieldsStore::new(),
            metas: SqliteMetaStore::new(),
        }
    }

    /// The underlying handle.
    pub fn handle(&self) -> &DbHandle {
        &self.handle
    }

    fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T>,
    {
        let mut conn = self.handle.lock().map_err(|_| StoreError::Poisoned)?;
        conn.immediate_transaction(f)
    }

    fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T>,
    {
        let mut conn = self.handle.lock().map_err(|_| StoreError::Poisoned)?;
        conn.transaction(f)
    }

    /// Inserts a whole aggregate.
    pub fn insert(&self, basics: &BasicsConfig) -> StoreResult<()> {
        self.write(|conn| self.basics.insert(conn, basics))?;
        info!(basic_id = %basics.basic_id, "config inserted");
        Ok(())
    }

    /// Fully hydrated aggregate, or `None`.
    pub fn get_by_id(&self, basic_id: &str) -> StoreResult<Option<BasicsConfig>> {
        self.read(|conn| self.basics.get_by_id(conn, basic_id))
    }

    /// Every aggregate in insertion order.
    pub fn get_all(&self) -> StoreResult<Vec<BasicsConfig>> {
        self.read(|conn| self.basics.get_all(conn))
    }

    /// Replaces an aggregate. Returns basics rows affected; 0 means it did not exist.
    pub fn update(&self, basics: &BasicsConfig) -> StoreResult<usize> {
        let n = self.write(|conn| self.basics.update(conn, basics))?;
        info!(basic_id = %basics.basic_id, rows = n, "config updated");
        Ok(n)
    }

    /// Deletes an aggregate with its fields config and meta trees. Returns rows affected.
    pub fn delete(&self, basic_id: &str) -> StoreResult<usize> {
        let n = self.write(|conn| self.basics.delete(conn, basic_id))?;
        info!(basic_id, rows = n, "config deleted");
        Ok(n)
    }

    /// Fields config with its meta trees, or `None`.
    pub fn get_fields_config_by_id(&self, field_id: &str) -> StoreResult<Option<FieldsConfig>> {
        self.read(|conn| self.fields.get_by_id(conn, field_id))
    }

    /// Deletes a fields config on its own. The owning basics row stays and reads
    /// back with `fields_config: None`.
    pub fn delete_fields_config(&self, field_id: &str) -> StoreResult<usize> {
        let n = self.write(|conn| self.fields.delete(conn, field_id))?;
        info!(field_id, rows = n, "fields config deleted");
        Ok(n)
    }

    /// Root-level nodes owned by `quote_id`, without their children.
    pub fn get_metas_config_by_quote_id(&self, quote_id: &str) -> StoreResult<Vec<MetasConfig>> {
        self.read(|conn| self.metas.read_roots(conn, quote_id))
    }

    /// Every tree owned by `quote_id`, fully nested.
    pub fn get_meta_tree_by_quote_id(&self, quote_id: &str) -> StoreResult<Vec<MetasConfig>> {
        self.read(|conn| self.metas.read_tree(conn, quote_id))
    }
}
