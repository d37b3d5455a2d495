//! Database utilities for connections, schema migrations, and per-script handles.
//!
//! This module provides:
//! - SQLite connection helpers: [`connection::connect_sqlite`] applies WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - Embedded Diesel migrations: [`migrate::run_sqlite`] and [`migrate::run_on`].
//! - [`registry::ScriptDbRegistry`]: one lazily opened, cached connection per script database.
//!
//! Example:
//! ```no_run
//! use script_config::db::{migrate, connection};
//!
//! let db_path = std::env::temp_dir().join("script_config_example.db");
//! migrate::run_sqlite(db_path.to_str().unwrap()).expect("migrations");
//!
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("connect");
//! ```

pub mod connection;
pub mod migrate;
pub mod registry;

pub use registry::{DbHandle, ScriptDbRegistry};
