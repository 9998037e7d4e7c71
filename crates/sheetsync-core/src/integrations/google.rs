//! Google Drive + Sheets document client.
//!
//! Drive supplies the `modifiedTime` watermark; Sheets supplies the cell
//! values. Both calls use the bearer token from [`GoogleAuth`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use super::oauth::GoogleAuth;
use super::traits::DocumentClient;
use crate::error::DocumentError;
use crate::sync::types::RawRow;

pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Google Drive + Sheets client.
pub struct GoogleDocs {
    auth: Arc<GoogleAuth>,
    http: Client,
    drive_base_url: String,
    sheets_base_url: String,
}

impl GoogleDocs {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self::with_base_urls(auth, DEFAULT_DRIVE_BASE_URL, DEFAULT_SHEETS_BASE_URL)
    }

    /// Point the client at other hosts (proxies, test servers).
    pub fn with_base_urls(auth: Arc<GoogleAuth>, drive_base_url: &str, sheets_base_url: &str) -> Self {
        Self {
            auth,
            http: Client::new(),
            drive_base_url: drive_base_url.trim_end_matches('/').to_string(),
            sheets_base_url: sheets_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, DocumentError> {
        let token = self.auth.access_token().await?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&token)
            .query(query)
            .send()
            .await?;
        read_json(resp).await
    }
}

/// Decode a Google API response, turning non-2xx statuses and `error`
/// bodies into [`DocumentError::Api`].
///
/// A success status whose body is not JSON is an error, never an empty result.
async fn read_json(resp: Response) -> Result<Value, DocumentError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let message = match body.get("error") {
            Some(err) => err["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| err.to_string()),
            None => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        return Err(DocumentError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body: Value = serde_json::from_str(&text)?;
    if let Some(err) = body.get("error") {
        return Err(DocumentError::Api {
            status: status.as_u16(),
            message: err.to_string(),
        });
    }
    Ok(body)
}

/// Convert the `values` payload of a Sheets response into raw rows.
///
/// Cells that are not JSON strings become `None`.
pub fn rows_from_values(body: &Value) -> Option<Vec<RawRow>> {
    let values = body.get("values")?.as_array()?;
    Some(
        values
            .iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| cells.iter().map(|c| c.as_str().map(String::from)).collect())
                    .unwrap_or_default()
            })
            .collect(),
    )
}

#[async_trait]
impl DocumentClient for GoogleDocs {
    async fn last_update(&self, document_id: &str) -> Result<String, DocumentError> {
        let url = format!(
            "{}/drive/v3/files/{}",
            self.drive_base_url,
            urlencoding::encode(document_id)
        );
        let body = self.get_json(&url, &[("fields", "modifiedTime")]).await?;

        body["modifiedTime"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| DocumentError::MissingField {
                document_id: document_id.to_string(),
                field: "modifiedTime".into(),
            })
    }

    async fn rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Option<Vec<RawRow>>, DocumentError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.sheets_base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        );
        let body = self.get_json(&url, &[]).await?;
        Ok(rows_from_values(&body))
    }
}
