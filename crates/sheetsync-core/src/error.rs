//! Core error types for sheetsync-core.
//!
//! Each external boundary (documents, state store, OAuth, configuration) has
//! its own `thiserror` enum; [`CoreError`] wraps them for callers that drive
//! a whole sync pass.

use std::path::PathBuf;
use thiserror::Error;

/// Anything that can stop a sync pass.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),
}

/// Errors raised while talking to the document service.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status or an error body.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response for '{document_id}' is missing field '{field}'")]
    MissingField { document_id: String, field: String },

    /// A success response whose body is not the expected JSON.
    #[error("Undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Could not obtain an access token: {0}")]
    Auth(#[from] OAuthError),
}

/// Errors raised by a state store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Database API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cannot create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open state database {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A writer panicked while holding the connection.
    #[error("State database connection is poisoned")]
    Locked,

    #[error("Record (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not obtain an access token: {0}")]
    Auth(#[from] OAuthError),
}

/// Problems with the config file, targets file or credentials bundle.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Bad value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Missing required setting: {0}")]
    MissingKey(String),

    #[error("Config is not valid TOML: {0}")]
    ParseFailed(String),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Google OAuth2 failures, interactive or during refresh.
#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Code exchange rejected: {0}")]
    TokenExchangeFailed(String),

    #[error("Token refresh rejected: {0}")]
    TokenRefreshFailed(String),

    #[error("No redirect received within {timeout_secs}s")]
    CallbackTimeout { timeout_secs: u64 },

    #[error("Unexpected redirect request: {0}")]
    InvalidCallback(String),

    /// The cached token is unusable and there is nothing to refresh it with.
    #[error("Access token expired and no refresh token available")]
    TokenExpired,

    #[error("No {service} client id/secret in the credentials bundle")]
    CredentialsNotConfigured { service: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Redirect listener failed: {0}")]
    Io(#[from] std::io::Error),

    /// The service-account key could not sign the token assertion.
    #[error("Cannot sign service-account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl From<tokio::time::error::Elapsed> for OAuthError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        OAuthError::CallbackTimeout {
            timeout_secs: crate::integrations::oauth::CALLBACK_TIMEOUT_SECS,
        }
    }
}

/// Result alias defaulting to [`CoreError`].
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
