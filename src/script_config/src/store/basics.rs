//! Basics rows: the root of an aggregate.
//!
//! A basics row points at its fields row through the nullable `fields_id`
//! column (`ON DELETE SET NULL`) and owns the meta trees keyed by its own id.
//! Deleting a basics row takes the fields row and every meta tree with it;
//! deleting the fields row alone only clears the pointer. A pointer that still
//! names a vanished fields row reads back as `fields_config: None`.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use tracing::{debug, warn};

use crate::configs::BasicsConfig;
use crate::models::{BasicsRow, BasicsScalars, NewBasicsRow};
use crate::schema::basics_config;
use crate::store::fields::fields_exists;
use crate::store::{
    BasicsStore, FieldsStore, MetaStore, SqliteFieldsStore, SqliteMetaStore, StoreError,
    StoreResult,
};

/// SQLite implementation of [`BasicsStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteBasicsStore {
    fields: SqliteFieldsStore,
    metas: SqliteMetaStore,
}

impl SqliteBasicsStore {
    /// Creates the store.
    pub fn new() -> Self {
        Self::default()
    }

    fn hydrate(&self, conn: &mut SqliteConnection, row: BasicsRow) -> StoreResult<BasicsConfig> {
        let fields_config = match row.fields_id.as_deref() {
            Some(field_id) => {
                let f = self.fields.get_by_id(conn, field_id)?;
                if f.is_none() {
                    warn!(basic_id = %row.basic_id, field_id, "fields pointer is dangling");
                }
                f
            }
            None => None,
        };
        let meta_list = self.metas.read_tree(conn, &row.basic_id)?;

        Ok(BasicsConfig {
            basic_id: row.basic_id,
            scripts_id: row.scripts_id,
            api_url_field: row.api_url_field,
            url_params_field: row.url_params_field,
            url_typed_field: row.url_typed_field,
            root_path: row.root_path,
            fields_config,
            meta_list,
        })
    }

    /// `None` when the row is missing, `Some(pointer)` otherwise.
    fn fields_pointer(
        conn: &mut SqliteConnection,
        basic_id: &str,
    ) -> StoreResult<Option<Option<String>>> {
        Ok(basics_config::table
            .find(basic_id)
            .select(basics_config::fields_id)
            .first::<Option<String>>(conn)
            .optional()?)
    }
}

impl BasicsStore for SqliteBasicsStore {
    fn insert(&self, conn: &mut SqliteConnection, basics: &BasicsConfig) -> StoreResult<()> {
        conn.transaction::<_, StoreError, _>(|conn| {
            if let Some(f) = &basics.fields_config {
                self.fields.insert(conn, f)?;
            }

            let row = NewBasicsRow {
                basic_id: &basics.basic_id,
                scripts_id: &basics.scripts_id,
                api_url_field: &basics.api_url_field,
                url_params_field: basics.url_params_field.as_deref(),
                url_typed_field: basics.url_typed_field,
                root_path: &basics.root_path,
                fields_id: basics.fields_config.as_ref().map(|f| f.field_id.as_str()),
            };
            diesel::insert_into(basics_config::table)
                .values(&row)
                .execute(conn)?;

            self.metas
                .write_tree(conn, &basics.basic_id, &basics.meta_list)?;
            debug!(basic_id = %basics.basic_id, "inserted basics config");
            Ok(())
        })
    }

    fn get_by_id(
        &self,
        conn: &mut SqliteConnection,
        basic_id: &str,
    ) -> StoreResult<Option<BasicsConfig>> {
        let row = basics_config::table
            .find(basic_id)
            .select(BasicsRow::as_select())
            .first(conn)
            .optional()?;

        row.map(|r| self.hydrate(conn, r)).transpose()
    }

    fn get_all(&self, conn: &mut SqliteConnection) -> StoreResult<Vec<BasicsConfig>> {
        let rows: Vec<BasicsRow> = basics_config::table
            .order(sql::<BigInt>("rowid"))
            .select(BasicsRow::as_select())
            .load(conn)?;

        rows.into_iter().map(|r| self.hydrate(conn, r)).collect()
    }

    fn update(&self, conn: &mut SqliteConnection, basics: &BasicsConfig) -> StoreResult<usize> {
        conn.transaction::<_, StoreError, _>(|conn| {
            let Some(old_pointer) = Self::fields_pointer(conn, &basics.basic_id)? else {
                debug!(basic_id = %basics.basic_id, "update skipped: no such basics config");
                return Ok(0);
            };

            let n = diesel::update(basics_config::table.find(&basics.basic_id))
                .set(&BasicsScalars {
                    scripts_id: &basics.scripts_id,
                    api_url_field: &basics.api_url_field,
                    url_params_field: basics.url_params_field.as_deref(),
                    url_typed_field: basics.url_typed_field,
                    root_path: &basics.root_path,
                })
                .execute(conn)?;

            // Clear both owned trees before writing either; a node may move
            // between them keeping its id. A dangling pointer's leftover tree is
            // cleared too, but it counts as "no fields row".
            self.metas.delete_tree(conn, &basics.basic_id)?;
            let old_fields = match old_pointer {
                Some(id) => {
                    self.metas.delete_tree(conn, &id)?;
                    fields_exists(conn, &id)?.then_some(id)
                }
                None => None,
            };

            self.metas
                .write_tree(conn, &basics.basic_id, &basics.meta_list)?;

            let new_pointer = match (old_fields, &basics.fields_config) {
                (None, None) => None,
                (None, Some(f)) => {
                    self.fields.insert(conn, f)?;
                    Some(f.field_id.as_str())
                }
                (Some(old), Some(f)) if old == f.field_id => {
                    self.fields.update(conn, f)?;
                    Some(f.field_id.as_str())
                }
                (Some(old), Some(f)) => {
                    self.fields.delete(conn, &old)?;
                    self.fields.insert(conn, f)?;
                    Some(f.field_id.as_str())
                }
                (Some(old), None) => {
                    self.fields.delete(conn, &old)?;
                    None
                }
            };

            diesel::update(basics_config::table.find(&basics.basic_id))
                .set(basics_config::fields_id.eq(new_pointer))
                .execute(conn)?;

            debug!(basic_id = %basics.basic_id, rows = n, "updated basics config");
            Ok(n)
        })
    }

    fn delete(&self, conn: &mut SqliteConnection, basic_id: &str) -> StoreResult<usize> {
        conn.transaction::<_, StoreError, _>(|conn| {
            let Some(pointer) = Self::fields_pointer(conn, basic_id)? else {
                return Ok(0);
            };

            if let Some(field_id) = pointer {
                self.fields.delete(conn, &field_id)?;
            }
            self.metas.delete_tree(conn, basic_id)?;
            let n = diesel::delete(basics_config::table.find(basic_id)).execute(conn)?;

            debug!(basic_id, rows = n, "deleted basics config");
            Ok(n)
        })
    }
}
