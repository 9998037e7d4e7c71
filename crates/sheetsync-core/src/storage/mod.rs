//! Where sync records and configuration live.

mod config;
pub mod database;
pub mod firebase;
pub mod migrations;
pub mod secrets;

pub use config::{Config, GoogleApiConfig, StoreBackend, StoreConfig};
pub use database::SqliteStore;
pub use firebase::{FirebaseAuth, FirebaseStore};
pub use secrets::Secrets;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{ConfigError, StoreError};
use crate::sync::types::SyncRecord;

/// Persistence for per-destination sync records.
///
/// `write` replaces the whole record; there is no merge or delete.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<SyncRecord>, StoreError>;

    async fn write(&self, key: &str, record: &SyncRecord) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Box<T> {
    async fn read(&self, key: &str) -> Result<Option<SyncRecord>, StoreError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, record: &SyncRecord) -> Result<(), StoreError> {
        (**self).write(key, record).await
    }
}

/// Returns `~/.config/sheetsync[-dev]/` based on SHEETSYNC_ENV.
///
/// Set SHEETSYNC_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

    let env = std::env::var("SHEETSYNC_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("sheetsync-dev")
    } else {
        base_dir.join("sheetsync")
    })
}
