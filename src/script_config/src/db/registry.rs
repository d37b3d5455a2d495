//! One cached connection per script database.
//!
//! Every configured script gets its own database file under
//! [`StoreSettings::data_dir`]. The registry opens a file on first use (creating
//! the directory, applying PRAGMAs and pending migrations) and hands out the same
//! [`DbHandle`] afterwards, until [`ScriptDbRegistry::close`] drops it from the cache.
//!
//! The cache is read-mostly: lookups are one atomic load of an `Arc<HashMap<..>>`
//! snapshot (`arc-swap`), while open/close swap in a new map with `rcu`. Opening
//! a file that is not cached yet is serialized so two callers never migrate the
//! same file at once.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::db::{connection, migrate};
use crate::facade::ConfigsFacade;
use crate::settings::StoreSettings;
use crate::store::{StoreError, StoreResult};

/// Shared handle to one script database. The façade locks it for one operation at a time.
pub type DbHandle = Arc<Mutex<SqliteConnection>>;

/// Snapshot type held inside the cache, keyed by file stem.
type HandleMap = HashMap<String, DbHandle>;

/// Maps a script name onto a file stem that stays inside the data directory.
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`; an empty name becomes `_`.
pub fn file_stem(script: &str) -> String {
    let stem: String = script
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}

/// Registry of open script databases.
pub struct ScriptDbRegistry {
    settings: StoreSettings,
    handles: ArcSwap<HandleMap>,
    opening: Mutex<()>,
}

impl ScriptDbRegistry {
    /// Empty registry; nothing is opened until [`ScriptDbRegistry::open`].
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            handles: ArcSwap::from_pointee(HandleMap::new()),
            opening: Mutex::new(()),
        }
    }

    /// Settings every database is opened with.
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Path of the database file backing `script`.
    pub fn database_path(&self, script: &str) -> PathBuf {
        self.settings
            .data_dir
            .join(format!("{}.{}", file_stem(script), self.settings.file_extension))
    }

    /// Returns `true` if `script` has a cached handle.
    pub fn is_open(&self, script: &str) -> bool {
        self.handles.load().contains_key(&file_stem(script))
    }

    /// Returns the cached handle for `script`, opening and migrating the database on first use.
    pub fn open(&self, script: &str) -> StoreResult<DbHandle> {
        let key = file_stem(script);
        if let Some(h) = self.handles.load().get(&key) {
            return Ok(Arc::clone(h));
        }

        let _guard = self.opening.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(h) = self.handles.load().get(&key) {
            return Ok(Arc::clone(h));
        }

        std::fs::create_dir_all(&self.settings.data_dir)?;
        let path = self.database_path(script);
        let url = path.to_string_lossy().to_string();
        let conn = connection::connect_sqlite_with(&url, &self.settings)
            .and_then(|mut conn| migrate::run_on(&mut conn).map(|()| conn))
            .map_err(|e| StoreError::Open {
                path: path.clone(),
                message: format!("{e:#}"),
            })?;

        let handle: DbHandle = Arc::new(Mutex::new(conn));
        self.handles.rcu(|current| {
            let mut next = HandleMap::clone(current);
            next.insert(key.clone(), Arc::clone(&handle));
            next
        });

        info!(script, path = %path.display(), "opened script database");
        Ok(handle)
    }

    /// Façade over the database of `script`.
    pub fn facade(&self, script: &str) -> StoreResult<ConfigsFacade> {
        Ok(ConfigsFacade::new(self.open(script)?))
    }

    /// Drops the cached handle. The connection closes once outstanding façades are gone.
    ///
    /// Returns `false` if the script was not open.
    pub fn close(&self, script: &str) -> bool {
        let key = file_stem(script);
        let mut removed = false;
        self.handles.rcu(|current| {
            let mut next = HandleMap::clone(current);
            removed = next.remove(&key).is_some();
            next
        });
        if removed {
            debug!(script, "closed script database");
        }
        removed
    }

    /// Drops every cached handle.
    pub fn close_all(&self) {
        let previous = self.handles.swap(Arc::new(HandleMap::new()));
        debug!(count = previous.len(), "closed all script databases");
    }

    /// Closes `script` and deletes its database file and WAL side files.
    ///
    /// Returns `false` if there was no database file.
    pub fn remove_database(&self, script: &str) -> StoreResult<bool> {
        self.close(script);
        let path = self.database_path(script);
        let existed = path.exists();
        for suffix in ["", "-wal", "-shm"] {
            let mut p = path.clone().into_os_string();
            p.push(suffix);
            match std::fs::remove_file(PathBuf::from(p)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if existed {
            info!(script, "removed script database");
        }
        Ok(existed)
    }
}

impl std::fmt::Debug for ScriptDbRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open: Vec<String> = self.handles.load().keys().cloned().collect();
        f.debug_struct("ScriptDbRegistry")
            .field("settings", &self.settings)
            .field("open", &open)
            .finish()
    }
}
