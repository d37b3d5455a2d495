//! Persistence engine for script configurations.
//!
//! A script's configuration is an aggregate: a [`configs::BasicsConfig`] root, an
//! optional [`configs::FieldsConfig`], and arbitrarily deep [`configs::MetasConfig`]
//! trees owned by either. [`facade::ConfigsFacade`] reads and writes whole
//! aggregates atomically on top of the three SQLite stores in [`store`];
//! [`db::ScriptDbRegistry`] keeps one database per script.

#![deny(missing_docs)]

pub mod configs;
pub mod db;
pub mod facade;
pub mod models;
#[allow(missing_docs)]
pub mod schema;
pub mod settings;
pub mod store;

pub use configs::{BasicsConfig, FieldsConfig, MetasConfig};
pub use facade::ConfigsFacade;
pub use store::{StoreError, StoreResult};
