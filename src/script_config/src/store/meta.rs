//! Meta trees as flat rows.
//!
//! A tree is stored one row per node. Every row carries the owner id in
//! `quote_id`; the shape lives in `parent_meta_id` (NULL for roots) and
//! `position` (index among siblings). Writing walks the tree with an explicit
//! stack, assigning a node's id before its children are queued so they can
//! point at it. Reading loads all rows of an owner in one query and rebuilds
//! the nesting in memory, so neither direction is limited by call-stack depth.

use std::collections::HashMap;

use diesel::prelude::*;
use tracing::debug;

use crate::configs::{MetasConfig, new_id};
use crate::models::{MetaRow, NewMetaRow};
use crate::schema::metas_config;
use crate::store::{MetaStore, StoreError, StoreResult};

/// SQLite implementation of [`MetaStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteMetaStore;

impl SqliteMetaStore {
    /// Creates the store.
    pub fn new() -> Self {
        Self
    }
}

impl MetaStore for SqliteMetaStore {
    fn write_tree(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
        nodes: &[MetasConfig],
    ) -> StoreResult<usize> {
        if nodes.is_empty() {
            return Ok(0);
        }

        conn.transaction::<_, StoreError, _>(|conn| {
            let mut written = 0usize;
            // (parent id, sibling position, node); reversed so pops come out in order
            let mut stack: Vec<(Option<String>, i32, &MetasConfig)> = nodes
                .iter()
                .enumerate()
                .rev()
                .map(|(i, n)| (None, i as i32, n))
                .collect();

            while let Some((parent, position, node)) = stack.pop() {
                let meta_id = node.meta_id.clone().unwrap_or_else(new_id);
                if !node.quote_id.is_empty() && node.quote_id != owner_id {
                    debug!(meta_id = %meta_id, given = %node.quote_id, owner_id, "restamping quote id");
                }

                let row = NewMetaRow {
                    meta_id: &meta_id,
                    quote_id: owner_id,
                    parent_meta_id: parent.as_deref(),
                    meta_key: node.meta_key.as_deref(),
                    meta_value: node.meta_value.as_deref(),
                    meta_typed: node.meta_typed,
                    position,
                };
                diesel::insert_into(metas_config::table)
                    .values(&row)
                    .execute(conn)?;
                written += 1;

                stack.extend(
                    node.meta_list
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(i, child)| (Some(meta_id.clone()), i as i32, child)),
                );
            }

            debug!(owner_id, rows = written, "wrote meta tree");
            Ok(written)
        })
    }

    fn read_tree(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
    ) -> StoreResult<Vec<MetasConfig>> {
        let rows: Vec<MetaRow> = metas_config::table
            .filter(metas_config::quote_id.eq(owner_id))
            .order(metas_config::position.asc())
            .select(MetaRow::as_select())
            .load(conn)?;

        Ok(assemble(rows))
    }

    fn read_roots(
        &self,
        conn: &mut SqliteConnection,
        owner_id: &str,
    ) -> StoreResult<Vec<MetasConfig>> {
        let rows: Vec<MetaRow> = metas_config::table
            .filter(metas_config::quote_id.eq(owner_id))
            .filter(metas_config::parent_meta_id.is_null())
            .order(metas_config::position.asc())
            .select(MetaRow::as_select())
            .load(conn)?;

        Ok(rows.into_iter().map(|r| node_from_row(r, Vec::new())).collect())
    }

    fn delete_tree(&self, conn: &mut SqliteConnection, owner_id: &str) -> StoreResult<usize> {
        conn.transaction::<_, StoreError, _>(|conn| {
            let owned: i64 = metas_config::table
                .filter(metas_config::quote_id.eq(owner_id))
                .count()
                .get_result(conn)?;
            if owned == 0 {
                return Ok(0);
            }

            // Roots first so descendants go through the FK cascade, then anything
            // still tagged with the owner (left behind if cascades were disabled).
            diesel::delete(
                metas_config::table
                    .filter(metas_config::quote_id.eq(owner_id))
                    .filter(metas_config::parent_meta_id.is_null()),
            )
            .execute(conn)?;
            diesel::delete(metas_config::table.filter(metas_config::quote_id.eq(owner_id)))
                .execute(conn)?;

            debug!(owner_id, rows = owned, "deleted meta tree");
            Ok(owned as usize)
        })
    }
}

fn node_from_row(row: MetaRow, meta_list: Vec<MetasConfig>) -> MetasConfig {
    MetasConfig {
        meta_id: Some(row.meta_id),
        quote_id: row.quote_id,
        meta_key: row.meta_key,
        meta_value: row.meta_value,
        meta_typed: row.meta_typed,
        meta_list,
    }
}

/// Rebuilds nested trees from the flat rows of one owner.
///
/// `rows` must be sorted by `position`. Rows not reachable from a root are dropped.
fn assemble(rows: Vec<MetaRow>) -> Vec<MetasConfig> {
    let mut by_parent: HashMap<Option<String>, Vec<MetaRow>> = HashMap::new();
    for row in rows {
        by_parent
            .entry(row.parent_meta_id.clone())
            .or_default()
            .push(row);
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    let root_ids: Vec<String> = roots.iter().map(|r| r.meta_id.clone()).collect();

    // Parents land in `order` before any of their descendants.
    let mut order: Vec<MetaRow> = Vec::new();
    let mut child_ids: HashMap<String, Vec<String>> = HashMap::new();
    let mut stack = roots;
    while let Some(row) = stack.pop() {
        if let Some(kids) = by_parent.remove(&Some(row.meta_id.clone())) {
            child_ids.insert(
                row.meta_id.clone(),
                kids.iter().map(|k| k.meta_id.clone()).collect(),
            );
            stack.extend(kids);
        }
        order.push(row);
    }

    let mut built: HashMap<String, MetasConfig> = HashMap::with_capacity(order.len());
    for row in order.into_iter().rev() {
        let meta_list = child_ids
            .remove(&row.meta_id)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| built.remove(id))
            .collect();
        built.insert(row.meta_id.clone(), node_from_row(row, meta_list));
    }

    root_ids.iter().filter_map(|id| built.remove(id)).collect()
}
