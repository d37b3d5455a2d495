//! The configuration aggregate as callers see it.
//!
//! A [`BasicsConfig`] owns an optional [`FieldsConfig`] and a list of
//! [`MetasConfig`] trees; the fields config owns trees of its own. Every node of
//! a tree carries the id of the row that owns the tree in `quote_id`, at every
//! depth. Parent links are not part of this shape: the store derives them while
//! writing and resolves them while reading.
//!
//! JSON uses camelCase names (`basicId`, `metaList`, ...). A `metaList` that is
//! `null` or missing deserializes to an empty list; empty is the only form that
//! is ever persisted or returned. A node without `metaTyped` gets category 0;
//! an explicit `null` stays `None`.
//!
//! Tree depth is unbounded, so [`BasicsConfig::from_json`] reads documents
//! without `serde_json`'s recursion limit and grows the stack as needed.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Fresh identifier for a new basics, fields, or meta row.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<MetasConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<MetasConfig>>::deserialize(de)?.unwrap_or_default())
}

fn default_meta_typed() -> Option<i32> {
    Some(0)
}

/// Root configuration of a script source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicsConfig {
    /// Primary key; supplied by the caller, never reissued.
    pub basic_id: String,
    /// Script this configuration belongs to.
    pub scripts_id: String,
    /// Request URL (template).
    pub api_url_field: String,
    /// Extra URL parameters.
    #[serde(default)]
    pub url_params_field: Option<String>,
    /// Request kind discriminator.
    #[serde(default)]
    pub url_typed_field: i32,
    /// Path of the item list inside a response.
    pub root_path: String,
    /// Optional field mapping.
    #[serde(default)]
    pub fields_config: Option<FieldsConfig>,
    /// Root meta trees owned by this row.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_list: Vec<MetasConfig>,
}

/// Field mapping of a source's item shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsConfig {
    /// Primary key.
    pub field_id: String,
    /// Owner key for this row's meta trees. Equal to `field_id`.
    pub quote_id: String,
    /// Item field holding the id.
    pub id_field: String,
    /// Item field holding the title.
    pub title_field: String,
    /// Item field holding a picture.
    #[serde(default)]
    pub pic_field: Option<String>,
    /// Item field holding the body.
    #[serde(default)]
    pub content_field: Option<String>,
    /// Item field holding tags.
    #[serde(default)]
    pub tags_field: Option<String>,
    /// Item field holding the source link.
    #[serde(default)]
    pub source_url_field: Option<String>,
    /// Root meta trees owned by this row.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_list: Vec<MetasConfig>,
}

/// One key/value node of a meta tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetasConfig {
    /// Primary key. `None` asks the store to assign a fresh id on write.
    #[serde(default)]
    pub meta_id: Option<String>,
    /// Root owner of the tree. Overwritten with the owner id on write.
    #[serde(default)]
    pub quote_id: String,
    /// Node key.
    #[serde(default)]
    pub meta_key: Option<String>,
    /// Node value.
    #[serde(default)]
    pub meta_value: Option<String>,
    /// Node category; 0 when absent.
    #[serde(default = "default_meta_typed")]
    pub meta_typed: Option<i32>,
    /// Ordered children.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_list: Vec<MetasConfig>,
}

/// A required field was empty.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string was empty or whitespace.
    #[error("{entity}.{field} must not be empty")]
    EmptyField {
        /// `basics` or `fields`.
        entity: &'static str,
        /// Offending field name.
        field: &'static str,
    },
    /// `fieldsConfig.quoteId` does not match its `fieldId`.
    #[error("fields quote id `{quote_id}` does not match field id `{field_id}`")]
    FieldsQuoteMismatch {
        /// Field id.
        field_id: String,
        /// Quote id found instead.
        quote_id: String,
    },
}

fn require(entity: &'static str, field: &'static str, v: &str) -> Result<(), ValidationError> {
    if v.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

impl BasicsConfig {
    /// Parses one aggregate from JSON, however deep its meta trees are.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        let mut de = serde_json::Deserializer::from_str(s);
        de.disable_recursion_limit();
        let cfg = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(cfg)
    }

    /// New aggregate with a fresh `basic_id`, no fields config and no metas.
    pub fn new(
        scripts_id: impl Into<String>,
        api_url_field: impl Into<String>,
        root_path: impl Into<String>,
    ) -> Self {
        Self {
            basic_id: new_id(),
            scripts_id: scripts_id.into(),
            api_url_field: api_url_field.into(),
            url_params_field: None,
            url_typed_field: 0,
            root_path: root_path.into(),
            fields_config: None,
            meta_list: Vec::new(),
        }
    }

    /// Checks the required fields of this aggregate and its fields config.
    ///
    /// The stores persist whatever they are given; callers run this before writing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("basics", "basicId", &self.basic_id)?;
        require("basics", "apiUrlField", &self.api_url_field)?;
        require("basics", "rootPath", &self.root_path)?;
        if let Some(f) = &self.fields_config {
            f.validate()?;
        }
        Ok(())
    }
}

impl FieldsConfig {
    /// New fields config whose `quote_id` equals its fresh `field_id`.
    pub fn new(id_field: impl Into<String>, title_field: impl Into<String>) -> Self {
        let field_id = new_id();
        Self {
            quote_id: field_id.clone(),
            field_id,
            id_field: id_field.into(),
            title_field: title_field.into(),
            pic_field: None,
            content_field: None,
            tags_field: None,
            source_url_field: None,
            meta_list: Vec::new(),
        }
    }

    /// Checks required fields and the `quote_id == field_id` convention.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("fields", "fieldId", &self.field_id)?;
        require("fields", "idField", &self.id_field)?;
        require("fields", "titleField", &self.title_field)?;
        if self.quote_id != self.field_id {
            return Err(ValidationError::FieldsQuoteMismatch {
                field_id: self.field_id.clone(),
                quote_id: self.quote_id.clone(),
            });
        }
        Ok(())
    }
}

impl MetasConfig {
    /// Leaf node with a fresh id and category 0. `quote_id` is filled in on write.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            meta_id: Some(new_id()),
            quote_id: String::new(),
            meta_key: Some(key.into()),
            meta_value: value,
            meta_typed: Some(0),
            meta_list: Vec::new(),
        }
    }

    /// Replaces the children of this node.
    pub fn with_children(mut self, children: Vec<MetasConfig>) -> Self {
        self.meta_list = children;
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            n += 1;
            stack.extend(node.meta_list.iter());
        }
        n
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            stack.extend(node.meta_list.iter().map(|c| (c, d + 1)));
        }
        max
    }
}
