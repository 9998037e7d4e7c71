//! OAuth2 for the Google APIs.
//!
//! The daemon only ever refreshes: [`GoogleAuth`] hands out a cached access
//! token and trades the refresh token for a new one shortly before expiry.
//! [`authorize`] runs the one-off Authorization Code flow an operator uses to
//! obtain that refresh token:
//!
//! 1. Opens browser to authorization URL
//! 2. Listens on the redirect port for a single callback
//! 3. Exchanges the code for an access token (+ refresh token)

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::error::OAuthError;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:19821/callback";
pub const CALLBACK_TIMEOUT_SECS: u64 = 300;

/// Scopes needed to read Drive metadata and sheet values, and to write the
/// realtime database with the same token.
pub const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.metadata.readonly",
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/firebase.database",
];

/// Seconds before `expires_at` at which a token counts as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>, // Unix timestamp
    pub token_type: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
}

impl OAuthConfig {
    pub fn google(client_id: &str, client_secret: &str, redirect_uri: Option<&str>) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            scopes: GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
            redirect_uri: redirect_uri.unwrap_or(DEFAULT_REDIRECT_URI).to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Port the callback listener binds, taken from the redirect URI.
    pub fn redirect_port(&self) -> Result<u16, OAuthError> {
        url::Url::parse(&self.redirect_uri)
            .ok()
            .and_then(|u| u.port_or_known_default())
            .ok_or_else(|| {
                OAuthError::AuthorizationFailed(format!(
                    "redirect URI has no usable port: {}",
                    self.redirect_uri
                ))
            })
    }

    pub fn auth_url_full(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes),
        )
    }
}

/// Shared, self-refreshing Google credentials.
pub struct GoogleAuth {
    config: OAuthConfig,
    http: Client,
    tokens: Mutex<OAuthTokens>,
}

impl GoogleAuth {
    pub fn new(config: OAuthConfig, tokens: OAuthTokens) -> Self {
        Self {
            config,
            http: Client::new(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Return a valid access token, refreshing if expired.
    pub async fn access_token(&self) -> Result<String, OAuthError> {
        let mut tokens = self.tokens.lock().await;
        if !is_expired(&tokens) {
            return Ok(tokens.access_token.clone());
        }

        let refresh = tokens
            .refresh_token
            .clone()
            .ok_or(OAuthError::TokenExpired)?;

        tracing::debug!("refreshing Google access token");
        *tokens = refresh_token(&self.http, &self.config, &refresh).await?;
        Ok(tokens.access_token.clone())
    }
}

/// Run the full OAuth2 flow: open browser -> listen for callback -> exchange code.
pub async fn authorize(config: &OAuthConfig) -> Result<OAuthTokens, OAuthError> {
    if config.client_id.is_empty() || config.client_secret.is_empty() {
        return Err(OAuthError::CredentialsNotConfigured {
            service: "google".into(),
        });
    }

    let listener = TcpListener::bind(("127.0.0.1", config.redirect_port()?)).await?;

    let auth_url = config.auth_url_full();
    if let Err(e) = open::that(&auth_url) {
        tracing::warn!(error = %e, "could not open a browser");
    }
    tracing::info!(url = %auth_url, "waiting for authorization");

    let code = tokio::time::timeout(
        Duration::from_secs(CALLBACK_TIMEOUT_SECS),
        accept_callback(&listener),
    )
    .await??;

    exchange_code(&Client::new(), config, &code).await
}

/// Serve exactly one request on the redirect listener and pull `code` out of it.
async fn accept_callback(listener: &TcpListener) -> Result<String, OAuthError> {
    let (mut stream, _) = listener.accept().await?;
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let code = extract_code(&request);
    let body = if code.is_some() {
        "<h2>Authentication successful!</h2><p>You can close this tab.</p>"
    } else {
        "<h2>Authentication failed.</h2><p>No authorization code received.</p>"
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body>{body}</body></html>"
    );
    stream.write_all(response.as_bytes()).await?;

    code.ok_or_else(|| OAuthError::InvalidCallback("no code in callback".into()))
}

/// Exchange authorization code for tokens.
async fn exchange_code(
    http: &Client,
    config: &OAuthConfig,
    code: &str,
) -> Result<OAuthTokens, OAuthError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let body: serde_json::Value = http
        .post(&config.token_url)
        .form(&params)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = body.get("error") {
        return Err(OAuthError::TokenExchangeFailed(error.to_string()));
    }

    tokens_from_response(&body, None).ok_or_else(|| {
        OAuthError::TokenExchangeFailed("missing access_token in response".into())
    })
}

/// Refresh an access token using a refresh token.
pub async fn refresh_token(
    http: &Client,
    config: &OAuthConfig,
    refresh: &str,
) -> Result<OAuthTokens, OAuthError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh),
        ("grant_type", "refresh_token"),
    ];

    let body: serde_json::Value = http
        .post(&config.token_url)
        .form(&params)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = body.get("error") {
        return Err(OAuthError::TokenRefreshFailed(error.to_string()));
    }

    tokens_from_response(&body, Some(refresh)).ok_or_else(|| {
        OAuthError::TokenRefreshFailed("missing access_token in response".into())
    })
}

/// Build a token set from a token-endpoint response.
///
/// Google omits `refresh_token` on refresh; `previous_refresh` is kept then.
pub(crate) fn tokens_from_response(
    body: &serde_json::Value,
    previous_refresh: Option<&str>,
) -> Option<OAuthTokens> {
    let access_token = body["access_token"].as_str()?.to_string();
    let expires_at = body
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .map(|ei| chrono::Utc::now().timestamp() + ei);

    Some(OAuthTokens {
        access_token,
        refresh_token: body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| previous_refresh.map(String::from)),
        expires_at,
        token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
        scope: body.get("scope").and_then(|v| v.as_str()).map(String::from),
    })
}

/// Check if tokens are expired (with 60s buffer). An empty access token
/// always counts as expired.
pub fn is_expired(tokens: &OAuthTokens) -> bool {
    if tokens.access_token.is_empty() {
        return true;
    }
    match tokens.expires_at {
        Some(exp) => chrono::Utc::now().timestamp() > exp - EXPIRY_SKEW_SECS,
        None => false,
    }
}

fn extract_code(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
}
