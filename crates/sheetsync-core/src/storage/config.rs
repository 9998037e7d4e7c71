//! TOML-based daemon configuration.
//!
//! Holds:
//! - The ordered list of sync targets (inline and/or from a JSON file)
//! - The pass interval and synced cell range
//! - Which state store to write to
//! - Where the credentials bundle lives
//!
//! Configuration is read from `--config`, then `$SHEETSYNC_CONFIG`, then
//! `~/.config/sheetsync/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::integrations::google::{DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL};
use crate::integrations::oauth::GOOGLE_TOKEN_URL;
use crate::sync::types::SyncTarget;

/// Where sync records are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Firebase,
    Sqlite,
}

/// State store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Realtime database root, e.g. `https://<project>.firebaseio.com`.
    #[serde(default)]
    pub database_url: Option<String>,
    /// SQLite file; defaults to `sheetsync.db` in the data directory.
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
}

/// Google API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleApiConfig {
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Delay between the end of one pass and the start of the next.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// A1 range read from every sheet.
    #[serde(default = "default_range")]
    pub range: String,
    /// Credentials bundle (JSON). `$SECRET_FILE` takes precedence.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,
    /// JSON list of `{ "table": ..., "sheet": ... }`, synced before inline targets.
    #[serde(default)]
    pub targets_file: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<SyncTarget>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub google: GoogleApiConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

// Default functions
fn default_interval_minutes() -> u64 {
    30
}
fn default_range() -> String {
    "C2:J".into()
}
fn default_secrets_file() -> PathBuf {
    PathBuf::from("secrets.json")
}
fn default_drive_base_url() -> String {
    DEFAULT_DRIVE_BASE_URL.into()
}
fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_BASE_URL.into()
}
fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.into()
}

impl Default for GoogleApiConfig {
    fn default() -> Self {
        Self {
            drive_base_url: default_drive_base_url(),
            sheets_base_url: default_sheets_base_url(),
            token_url: default_token_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            range: default_range(),
            secrets_file: default_secrets_file(),
            targets_file: None,
            targets: Vec::new(),
            store: StoreConfig::default(),
            google: GoogleApiConfig::default(),
            base_dir: None,
        }
    }
}

impl Config {
    /// Default location: `<data dir>/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, or from `$SHEETSYNC_CONFIG` / the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be parsed, or fails
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match std::env::var_os("SHEETSYNC_CONFIG") {
                Some(p) => PathBuf::from(p),
                None => Self::default_path()?,
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.base_dir = path.parent().map(Path::to_path_buf);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse without validating or resolving paths.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Check values that serde defaults cannot guard.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "interval_minutes".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.range.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "range".into(),
                message: "must not be empty".into(),
            });
        }
        if self.targets.is_empty() && self.targets_file.is_none() {
            return Err(ConfigError::MissingKey("targets".into()));
        }
        if self.store.backend == StoreBackend::Firebase
            && self.store.database_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingKey("store.database_url".into()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }

    /// Resolve `path` against the config file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Credentials bundle path; `$SECRET_FILE` wins over the config value.
    pub fn secrets_path(&self) -> PathBuf {
        match std::env::var_os("SECRET_FILE") {
            Some(p) => PathBuf::from(p),
            None => self.resolve_path(&self.secrets_file),
        }
    }

    /// SQLite path for the `sqlite` backend.
    pub fn sqlite_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store.sqlite_path {
            Some(p) => Ok(self.resolve_path(p)),
            None => Ok(data_dir()?.join("sheetsync.db")),
        }
    }

    /// All targets in sync order: `targets_file` entries, then inline ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the targets file cannot be read or parsed, or the
    /// resulting list is empty.
    pub fn resolve_targets(&self) -> Result<Vec<SyncTarget>, ConfigError> {
        let mut targets = Vec::new();

        if let Some(file) = &self.targets_file {
            let path = self.resolve_path(file);
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
            let listed: Vec<SyncTarget> =
                serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })?;
            targets.extend(listed);
        }

        targets.extend(self.targets.iter().cloned());

        if targets.is_empty() {
            return Err(ConfigError::MissingKey("targets".into()));
        }
        Ok(targets)
    }
}
