//! Credentials bundle (`secrets.json`).
//!
//! ```json
//! {
//!   "google": {
//!     "clientId": "...", "clientSecret": "...", "redirectUrl": "...",
//!     "token": { "access_token": "...", "refresh_token": "...", "expiry_date": 1700000000000 }
//!   },
//!   "firebase": { "type": "service_account", "client_email": "...", "private_key": "...", ... }
//! }
//! ```
//!
//! `token` uses the field names Google's token endpoint and Node client
//! produce; `expiry_date` is in epoch milliseconds. `firebase` is either a
//! service-account key file pasted in as is, or `{ "databaseSecret": "..." }`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::integrations::oauth::{OAuthConfig, OAuthTokens};
use crate::integrations::service_account::ServiceAccountKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secrets {
    pub google: GoogleSecrets,
    #[serde(default)]
    pub firebase: Option<FirebaseSecrets>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub token: StoredToken,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub expiry_date: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Firebase section. Key-file fields keep their snake_case names; keys not
/// listed here are carried through unchanged when the bundle is rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirebaseSecrets {
    #[serde(default, rename = "databaseSecret", skip_serializing_if = "Option::is_none")]
    pub database_secret: Option<String>,
    #[serde(default, alias = "clientEmail", skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, alias = "privateKey", skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, alias = "privateKeyId", skip_serializing_if = "Option::is_none")]
    pub private_key_id: Option<String>,
    #[serde(default, alias = "tokenUri", skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Secrets {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid bundle.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn oauth_config(&self, token_url: &str) -> OAuthConfig {
        OAuthConfig::google(
            &self.google.client_id,
            &self.google.client_secret,
            self.google.redirect_url.as_deref(),
        )
        .with_token_url(token_url)
    }

    pub fn database_secret(&self) -> Option<&str> {
        self.firebase
            .as_ref()
            .and_then(|f| f.database_secret.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Service-account key, when the Firebase section carries both an
    /// account email and a private key.
    pub fn service_account(&self) -> Option<ServiceAccountKey> {
        let firebase = self.firebase.as_ref()?;
        let email = firebase.client_email.as_deref().filter(|s| !s.is_empty())?;
        let private_key = firebase.private_key.as_deref().filter(|s| !s.is_empty())?;
        let mut key = ServiceAccountKey::new(email, private_key);
        key.private_key_id = firebase.private_key_id.clone();
        if let Some(uri) = firebase.token_uri.as_deref().filter(|s| !s.is_empty()) {
            key.token_uri = uri.to_string();
        }
        Some(key)
    }
}

impl From<&StoredToken> for OAuthTokens {
    fn from(token: &StoredToken) -> Self {
        OAuthTokens {
            access_token: token.access_token.clone().unwrap_or_default(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token.expiry_date.map(|ms| ms / 1000),
            token_type: token.token_type.clone().unwrap_or_else(|| "Bearer".into()),
            scope: token.scope.clone(),
        }
    }
}

impl From<&OAuthTokens> for StoredToken {
    fn from(tokens: &OAuthTokens) -> Self {
        StoredToken {
            access_token: Some(tokens.access_token.clone()),
            refresh_token: tokens.refresh_token.clone(),
            expiry_date: tokens.expires_at.map(|secs| secs * 1000),
            token_type: Some(tokens.token_type.clone()),
            scope: tokens.scope.clone(),
        }
    }
}
