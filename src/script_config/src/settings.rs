//! Store settings: where script databases live and how connections are tuned.
//!
//! Settings come from a TOML document ([`load_settings_str`], [`load_settings_path`])
//! or from the environment ([`StoreSettings::from_env`]):
//!
//! ```toml
//! data_dir = "/var/lib/aggregator/scripts"
//! busy_timeout_ms = 5000
//! journal_mode = "wal"
//! file_extension = "db"
//! ```
//!
//! Only `data_dir` is required. Unknown keys are rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming the database directory.
pub const ENV_DATA_DIR: &str = "SCRIPT_CONFIG_DATA_DIR";
/// Environment variable overriding the busy timeout (milliseconds).
pub const ENV_BUSY_TIMEOUT_MS: &str = "SCRIPT_CONFIG_BUSY_TIMEOUT_MS";

/// Errors raised while loading settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// An environment variable required by the store is not set.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    /// An environment variable is set but not parseable.
    #[error("invalid value for {name}: {value}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
    },
    /// The settings file could not be read.
    #[error("failed to read settings file {path}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The settings document is not valid TOML for [`StoreSettings`].
    #[error("invalid settings document")]
    Parse(#[from] toml::de::Error),
    /// `data_dir` is empty.
    #[error("data_dir cannot be empty")]
    EmptyDataDir,
}

/// SQLite journal mode applied on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// Write-ahead log.
    #[default]
    Wal,
    /// Rollback journal.
    Delete,
}

impl JournalMode {
    /// Value used in `PRAGMA journal_mode`.
    pub fn as_pragma(self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
        }
    }
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_file_extension() -> String {
    "db".to_string()
}

/// Settings shared by every script database opened through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSettings {
    /// Directory holding one database file per script.
    pub data_dir: PathBuf,
    /// `PRAGMA busy_timeout` in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
    /// `PRAGMA journal_mode`.
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// Extension of database files (without the dot).
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl StoreSettings {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            file_extension: default_file_extension(),
        }
    }

    /// Reads [`ENV_DATA_DIR`] (required) and [`ENV_BUSY_TIMEOUT_MS`] (optional).
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`StoreSettings::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = lookup(ENV_DATA_DIR)
            .ok_or_else(|| SettingsError::MissingEnvVar(ENV_DATA_DIR.into()))?;
        let mut settings = Self::new(dir);
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            settings.busy_timeout_ms =
                raw.trim()
                    .parse()
                    .map_err(|_| SettingsError::InvalidEnvVar {
                        name: ENV_BUSY_TIMEOUT_MS.into(),
                        value: raw.clone(),
                    })?;
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(SettingsError::EmptyDataDir);
        }
        Ok(())
    }
}

/// Parse settings from a TOML string.
pub fn load_settings_str(s: &str) -> Result<StoreSettings, SettingsError> {
    let settings: StoreSettings = toml::from_str(s)?;
    settings.validate()?;
    Ok(settings)
}

/// Parse settings from a TOML file.
pub fn load_settings_path(path: impl AsRef<Path>) -> Result<StoreSettings, SettingsError> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_settings_str(&s)
}
