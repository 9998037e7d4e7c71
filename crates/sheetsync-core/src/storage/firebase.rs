//! Firebase Realtime Database state store (REST API).
//!
//! Each destination key is a database path; the record is stored at
//! `{database_url}/{key}.json` and replaced wholesale with `PUT`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::StateStore;
use crate::error::StoreError;
use crate::integrations::oauth::GoogleAuth;
use crate::integrations::service_account::ServiceAccountAuth;
use crate::sync::types::SyncRecord;

/// How requests to the database are authorized.
pub enum FirebaseAuth {
    /// Legacy database secret, sent as `?auth=`.
    DatabaseSecret(String),
    /// Service-account token, sent as `?access_token=`.
    ServiceAccount(Arc<ServiceAccountAuth>),
    /// Google OAuth access token, sent as `?access_token=`.
    OAuth(Arc<GoogleAuth>),
}

pub struct FirebaseStore {
    database_url: String,
    auth: FirebaseAuth,
    http: Client,
}

impl FirebaseStore {
    pub fn new(database_url: &str, auth: FirebaseAuth) -> Self {
        Self {
            database_url: database_url.trim_end_matches('/').to_string(),
            auth,
            http: Client::new(),
        }
    }

    /// REST URL for `key`, each path segment percent-encoded.
    pub fn record_url(&self, key: &str) -> String {
        let path = key
            .trim_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}.json", self.database_url, path)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        Ok(match &self.auth {
            FirebaseAuth::DatabaseSecret(secret) => request.query(&[("auth", secret.as_str())]),
            FirebaseAuth::ServiceAccount(account) => {
                let token = account.access_token().await?;
                request.query(&[("access_token", token.as_str())])
            }
            FirebaseAuth::OAuth(google) => {
                let token = google.access_token().await?;
                request.query(&[("access_token", token.as_str())])
            }
        })
    }
}

async fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
    let message = body["error"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl StateStore for FirebaseStore {
    async fn read(&self, key: &str) -> Result<Option<SyncRecord>, StoreError> {
        let request = self.authorize(self.http.get(self.record_url(key))).await?;
        let resp = check_status(request.send().await?).await?;
        let text = resp.text().await?;
        Ok(serde_json::from_str::<Option<SyncRecord>>(&text)?)
    }

    async fn write(&self, key: &str, record: &SyncRecord) -> Result<(), StoreError> {
        let request = self
            .authorize(self.http.put(self.record_url(key)).json(record))
            .await?;
        check_status(request.send().await?).await?;
        Ok(())
    }
}
