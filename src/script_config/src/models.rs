//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel's Queryable/Insertable APIs:
//! - [`crate::schema::basics_config`]: root configuration of a script
//! - [`crate::schema::fields_config`]: optional field mapping of a basics row
//! - [`crate::schema::metas_config`]: recursive key/value nodes
//!
//! See migrations for the FK actions (`ON DELETE SET NULL` on
//! `basics_config.fields_id`, `ON DELETE CASCADE` on `metas_config.parent_meta_id`).
//! The nested domain shapes live in [`crate::configs`]; the stores translate between them.

use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::basics_config`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = basics_config, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(basic_id))]
pub struct BasicsRow {
    /// Primary key, caller supplied.
    pub basic_id: String,
    /// Opaque reference to the owning script.
    pub scripts_id: String,
    /// Request URL template.
    pub api_url_field: String,
    /// Optional URL parameters.
    pub url_params_field: Option<String>,
    /// Request kind discriminator.
    pub url_typed_field: i32,
    /// Path of the item list inside the response.
    pub root_path: String,
    /// Nullable pointer to [`FieldsRow::field_id`]; set to NULL when that row is deleted.
    pub fields_id: Option<String>,
}

/// Insertable form of [`BasicsRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = basics_config)]
pub struct NewBasicsRow<'a> {
    /// Primary key.
    pub basic_id: &'a str,
    /// Opaque reference to the owning script.
    pub scripts_id: &'a str,
    /// Request URL template.
    pub api_url_field: &'a str,
    /// Optional URL parameters.
    pub url_params_field: Option<&'a str>,
    /// Request kind discriminator.
    pub url_typed_field: i32,
    /// Path of the item list inside the response.
    pub root_path: &'a str,
    /// Pointer to the fields row, if one is attached.
    pub fields_id: Option<&'a str>,
}

/// Scalar changeset for [`BasicsRow`]. Leaves `fields_id` alone; the store reconciles it separately.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = basics_config, treat_none_as_null = true)]
pub struct BasicsScalars<'a> {
    /// Replacement script reference.
    pub scripts_id: &'a str,
    /// Replacement URL template.
    pub api_url_field: &'a str,
    /// Replacement URL parameters (None writes NULL).
    pub url_params_field: Option<&'a str>,
    /// Replacement discriminator.
    pub url_typed_field: i32,
    /// Replacement root path.
    pub root_path: &'a str,
}

/// A row in [`crate::schema::fields_config`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = fields_config, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(field_id))]
pub struct FieldsRow {
    /// Primary key.
    pub field_id: String,
    /// Owner key of the row's meta trees; equal to `field_id` in practice.
    pub quote_id: String,
    /// Source field holding the item id.
    pub id_field: String,
    /// Source field holding the item title.
    pub title_field: String,
    /// Source field holding a picture URL.
    pub pic_field: Option<String>,
    /// Source field holding the body.
    pub content_field: Option<String>,
    /// Source field holding tags.
    pub tags_field: Option<String>,
    /// Source field holding the original URL.
    pub source_url_field: Option<String>,
}

/// Insertable/changeset form of [`FieldsRow`].
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = fields_config, treat_none_as_null = true)]
pub struct NewFieldsRow<'a> {
    /// Primary key.
    pub field_id: &'a str,
    /// Owner key of the row's meta trees.
    pub quote_id: &'a str,
    /// Source field holding the item id.
    pub id_field: &'a str,
    /// Source field holding the item title.
    pub title_field: &'a str,
    /// Source field holding a picture URL.
    pub pic_field: Option<&'a str>,
    /// Source field holding the body.
    pub content_field: Option<&'a str>,
    /// Source field holding tags.
    pub tags_field: Option<&'a str>,
    /// Source field holding the original URL.
    pub source_url_field: Option<&'a str>,
}

/// A row in [`crate::schema::metas_config`]: one node of a meta tree.
///
/// `parent_meta_id` is NULL for roots. Children are removed by FK `ON DELETE CASCADE`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = metas_config, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(meta_id))]
pub struct MetaRow {
    /// Primary key.
    pub meta_id: String,
    /// Root owner of the whole tree.
    pub quote_id: String,
    /// Parent node, NULL for roots.
    pub parent_meta_id: Option<String>,
    /// Node key.
    pub meta_key: Option<String>,
    /// Node value.
    pub meta_value: Option<String>,
    /// Node category.
    pub meta_typed: Option<i32>,
    /// Index among siblings.
    pub position: i32,
}

/// Insertable form of [`MetaRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = metas_config)]
pub struct NewMetaRow<'a> {
    /// Primary key.
    pub meta_id: &'a str,
    /// Root owner of the whole tree.
    pub quote_id: &'a str,
    /// Parent node, None for roots.
    pub parent_meta_id: Option<&'a str>,
    /// Node key.
    pub meta_key: Option<&'a str>,
    /// Node value.
    pub meta_value: Option<&'a str>,
    /// Node category.
    pub meta_typed: Option<i32>,
    /// Index among siblings.
    pub position: i32,
}
