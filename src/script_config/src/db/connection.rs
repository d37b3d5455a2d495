//! SQLite connection helpers.
//!
//! Provides [`connect_sqlite`] that opens a connection and applies the PRAGMAs the
//! stores rely on: WAL journaling, foreign_keys=ON (required for the
//! `ON DELETE CASCADE` / `ON DELETE SET NULL` actions), and a 5000ms busy_timeout.
//! [`connect_sqlite_with`] takes the values from [`StoreSettings`].
//!
//! Example:
//! ```no_run
//! use script_config::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("script_config_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open sqlite");
//! ```

use diesel::{Connection, SqliteConnection, connection::SimpleConnection};

use crate::settings::{JournalMode, StoreSettings};

/// Open a SQLite connection and apply connection-wide PRAGMAs with default values.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    open(database_url, JournalMode::Wal, 5000)
}

/// Open a SQLite connection tuned by `settings`.
pub fn connect_sqlite_with(
    database_url: &str,
    settings: &StoreSettings,
) -> anyhow::Result<SqliteConnection> {
    open(database_url, settings.journal_mode, settings.busy_timeout_ms)
}

fn open(
    database_url: &str,
    journal_mode: JournalMode,
    busy_timeout_ms: u32,
) -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)?;

    conn.batch_execute(&format!(
        "PRAGMA journal_mode={};
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout={busy_timeout_ms};",
        journal_mode.as_pragma()
    ))?;
    Ok(conn)
}
