//! Spreadsheet-to-database synchronization.
//!
//! A pass walks the configured targets one at a time: read the stored
//! watermark, ask Drive for the sheet's modified time, and only when the
//! sheet is newer re-read its rows, regroup them and overwrite the record.

pub mod normalize;
pub mod processor;
pub mod scheduler;
pub mod types;
pub mod watermark;

#[cfg(test)]
mod scheduler_tests;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use normalize::normalize;
pub use processor::{SyncProcessor, DEFAULT_RANGE};
pub use scheduler::{SyncScheduler, DEFAULT_INTERVAL};
pub use types::{CommunityGroup, PassSummary, RawRow, Speaker, SyncRecord, SyncTarget};
pub use watermark::{needs_update, parse_timestamp};

use crate::error::{ConfigError, Result};
use crate::integrations::service_account::FIREBASE_SCOPES;
use crate::integrations::{GoogleAuth, GoogleDocs, ServiceAccountAuth};
use crate::storage::{
    Config, FirebaseAuth, FirebaseStore, Secrets, SqliteStore, StateStore, StoreBackend,
};

/// The scheduler as wired from configuration.
pub type ConfiguredScheduler = SyncScheduler<GoogleDocs, Box<dyn StateStore>>;

/// Build the configured state store.
///
/// Firebase prefers a service-account key, then a database secret, and
/// falls back to `auth` when the bundle carries neither.
pub fn build_store(
    config: &Config,
    secrets: &Secrets,
    auth: Arc<GoogleAuth>,
) -> Result<Box<dyn StateStore>> {
    let store: Box<dyn StateStore> = match config.store.backend {
        StoreBackend::Firebase => {
            let url = config
                .store
                .database_url
                .as_deref()
                .ok_or_else(|| ConfigError::MissingKey("store.database_url".into()))?;
            let firebase_auth = if let Some(key) = secrets.service_account() {
                tracing::debug!(account = %key.client_email, "firebase: service-account auth");
                let account = ServiceAccountAuth::new(key, FIREBASE_SCOPES);
                FirebaseAuth::ServiceAccount(Arc::new(account))
            } else if let Some(secret) = secrets.database_secret() {
                FirebaseAuth::DatabaseSecret(secret.to_string())
            } else {
                FirebaseAuth::OAuth(auth)
            };
            Box::new(FirebaseStore::new(url, firebase_auth))
        }
        StoreBackend::Sqlite => Box::new(SqliteStore::open(&config.sqlite_path()?)?),
    };
    Ok(store)
}

/// Wire Google credentials, the document client and the state store into a
/// ready-to-run scheduler.
pub fn build_scheduler(config: &Config, secrets: &Secrets) -> Result<ConfiguredScheduler> {
    let auth = Arc::new(GoogleAuth::new(
        secrets.oauth_config(&config.google.token_url),
        (&secrets.google.token).into(),
    ));
    let docs = GoogleDocs::with_base_urls(
        auth.clone(),
        &config.google.drive_base_url,
        &config.google.sheets_base_url,
    );
    let store = build_store(config, secrets, auth)?;
    let targets = config.resolve_targets()?;

    tracing::info!(
        targets = targets.len(),
        backend = ?config.store.backend,
        interval_minutes = config.interval_minutes,
        "scheduler configured"
    );

    Ok(
        SyncScheduler::new(SyncProcessor::new(docs, store).with_range(&config.range), targets)
            .with_interval(config.interval()),
    )
}
