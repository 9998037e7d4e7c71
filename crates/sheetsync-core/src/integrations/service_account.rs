//! Google service-account credentials.
//!
//! Signs a short-lived RS256 assertion with the account's private key and
//! trades it at the token endpoint (`jwt-bearer` grant) for an access token.
//! This is how the realtime database is reached with the certificate found in
//! the `firebase` section of the credentials bundle.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::oauth::{is_expired, tokens_from_response, OAuthTokens, GOOGLE_TOKEN_URL};
use crate::error::OAuthError;

/// Scopes the Firebase Admin SDK requests for database access.
pub const FIREBASE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/userinfo.email",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google caps assertion lifetime at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The parts of a service-account key file needed to mint tokens.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn new(client_email: &str, private_key: &str) -> Self {
        Self {
            client_email: client_email.to_string(),
            private_key: private_key.to_string(),
            private_key_id: None,
            token_uri: GOOGLE_TOKEN_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Cached, self-renewing service-account access token.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    http: Client,
    tokens: Mutex<OAuthTokens>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, scopes: &[&str]) -> Self {
        Self {
            key,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            http: Client::new(),
            tokens: Mutex::new(OAuthTokens::default()),
        }
    }

    /// Signed assertion valid from `now` (unix seconds) for one hour.
    pub(crate) fn assertion(&self, now: i64) -> Result<String, OAuthError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &signing_key)?)
    }

    /// Return a valid access token, minting a new one when the cached one
    /// is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, OAuthError> {
        let mut tokens = self.tokens.lock().await;
        if !is_expired(&tokens) {
            return Ok(tokens.access_token.clone());
        }

        tracing::debug!(account = %self.key.client_email, "requesting service-account token");
        let assertion = self.assertion(chrono::Utc::now().timestamp())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let body: serde_json::Value = self
            .http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = body.get("error") {
            return Err(OAuthError::TokenExchangeFailed(error.to_string()));
        }
        *tokens = tokens_from_response(&body, None).ok_or_else(|| {
            OAuthError::TokenExchangeFailed("missing access_token in response".into())
        })?;
        Ok(tokens.access_token.clone())
    }
}
