//! # sheetsync Core Library
//!
//! Copies speaker-program tables from Google Sheets into a realtime database,
//! refreshing a destination only when its source sheet changed since the
//! last successful write.
//!
//! ## Architecture
//!
//! - **Sync**: the table normalizer, the per-target processor and the
//!   sequential pass scheduler
//! - **Integrations**: the [`DocumentClient`] seam plus the Google Drive /
//!   Sheets client and its OAuth2 credentials
//! - **Storage**: the [`StateStore`] seam with Firebase and SQLite backends,
//!   TOML configuration and the JSON credentials bundle
//!
//! ## Key Components
//!
//! - [`normalize`]: rows to community-grouped programs
//! - [`SyncProcessor`]: change detection and rewrite for one target
//! - [`SyncScheduler`]: ordered passes on a fixed delay
//! - [`Config`]: daemon configuration

pub mod error;
pub mod integrations;
pub mod storage;
pub mod sync;

pub use error::{ConfigError, CoreError, DocumentError, OAuthError, StoreError};
pub use integrations::{DocumentClient, GoogleAuth, GoogleDocs};
pub use storage::{Config, Secrets, StateStore};
pub use sync::{
    build_scheduler, normalize, CommunityGroup, PassSummary, RawRow, Speaker, SyncProcessor,
    SyncRecord, SyncScheduler, SyncTarget,
};
