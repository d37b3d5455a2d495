//! Fields rows and the meta trees they own.

use diesel::prelude::*;
use tracing::debug;

use crate::configs::FieldsConfig;
use crate::models::{FieldsRow, NewFieldsRow};
use crate::schema::fields_config;
use crate::store::{FieldsStore, MetaStore, SqliteMetaStore, StoreError, StoreResult};

/// SQLite implementation of [`FieldsStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteFieldsStore {
    metas: SqliteMetaStore,
}

impl SqliteFieldsStore {
    /// Creates the store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn fields_row(f: &FieldsConfig) -> NewFieldsRow<'_> {
    NewFieldsRow {
        field_id: &f.field_id,
        quote_id: &f.quote_id,
        id_field: &f.id_field,
        title_field: &f.title_field,
        pic_field: f.pic_field.as_deref(),
        content_field: f.content_field.as_deref(),
        tags_field: f.tags_field.as_deref(),
        source_url_field: f.source_url_field.as_deref(),
    }
}

/// `true` when a fields row with this id exists.
pub(crate) fn fields_exists(conn: &mut SqliteConnection, field_id: &str) -> StoreResult<bool> {
    let n: i64 = fields_config::table
        .find(field_id)
        .count()
        .get_result(conn)?;
    Ok(n > 0)
}

impl FieldsStore for SqliteFieldsStore {
    fn insert(&self, conn: &mut SqliteConnection, fields: &FieldsConfig) -> StoreResult<()> {
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::insert_into(fields_config::table)
                .values(&fields_row(fields))
                .execute(conn)?;
            self.metas
                .write_tree(conn, &fields.field_id, &fields.meta_list)?;
            debug!(field_id = %fields.field_id, "inserted fields config");
            Ok(())
        })
    }

    fn get_by_id(
        &self,
        conn: &mut SqliteConnection,
        field_id: &str,
    ) -> StoreResult<Option<FieldsConfig>> {
        let Some(row) = fields_config::table
            .find(field_id)
            .select(FieldsRow::as_select())
            .first(conn)
            .optional()?
        else {
            return Ok(None);
        };

        let meta_list = self.metas.read_tree(conn, &row.field_id)?;
        Ok(Some(FieldsConfig {
            field_id: row.field_id,
            quote_id: row.quote_id,
            id_field: row.id_field,
            title_field: row.title_field,
            pic_field: row.pic_field,
            content_field: row.content_field,
            tags_field: row.tags_field,
            source_url_field: row.source_url_field,
            meta_list,
        }))
    }

    fn update(&self, conn: &mut SqliteConnection, fields: &FieldsConfig) -> StoreResult<usize> {
        conn.transaction::<_, StoreError, _>(|conn| {
            let n = diesel::update(fields_config::table.find(&fields.field_id))
                .set(&fields_row(fields))
                .execute(conn)?;
            if n == 0 {
                debug!(field_id = %fields.field_id, "update skipped: no such fields config");
                return Ok(0);
            }

            // delete-then-rewrite; ids the caller passed through survive
            self.metas.delete_tree(conn, &fields.field_id)?;
            self.metas
                .write_tree(conn, &fields.field_id, &fields.meta_list)?;
            Ok(n)
        })
    }

    fn delete(&self, conn: &mut SqliteConnection, field_id: &str) -> StoreResult<usize> {
        conn.transaction::<_, StoreError, _>(|conn| {
            self.metas.delete_tree(conn, field_id)?;
            // basics_config.fields_id is nulled by ON DELETE SET NULL
            let n = diesel::delete(fields_config::table.find(field_id)).execute(conn)?;
            debug!(field_id, rows = n, "deleted fields config");
            Ok(n)
        })
    }
}
