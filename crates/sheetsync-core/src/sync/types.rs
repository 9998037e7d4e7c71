//! Core types for spreadsheet-to-database synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One spreadsheet row as returned by the Sheets API.
///
/// Cells are positional: index 0 is column C of the synced range. A cell the
/// API sent as something other than a string is `None`.
pub type RawRow = Vec<Option<String>>;

/// A (destination key, source document) pair from static configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncTarget {
    /// Where the synced record lives in the state store.
    #[serde(rename = "table")]
    pub destination_key: String,
    /// Spreadsheet / Drive file id to read from.
    #[serde(rename = "sheet")]
    pub source_document_id: String,
}

impl SyncTarget {
    pub fn new(destination_key: impl Into<String>, source_document_id: impl Into<String>) -> Self {
        Self {
            destination_key: destination_key.into(),
            source_document_id: source_document_id.into(),
        }
    }
}

/// A single program entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Always `None`; speaker photos are not synced.
    #[serde(default)]
    pub photo: Option<String>,
}

/// Speakers sharing one community, ordered by `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityGroup {
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub program: Vec<Speaker>,
}

/// What gets persisted per destination key.
///
/// `data` serializes as an explicit `null` when the sheet had no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Source document's modified time, exactly as the API reported it.
    #[serde(rename = "lastFileUpdate")]
    pub last_file_update: String,
    #[serde(default)]
    pub data: Option<Vec<CommunityGroup>>,
}

/// Outcome of one full pass over the configured targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassSummary {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Destination keys that were rewritten.
    pub updated: Vec<String>,
    /// Destination keys whose source had not changed.
    pub unchanged: Vec<String>,
}

impl PassSummary {
    pub fn processed(&self) -> usize {
        self.updated.len() + self.unchanged.len()
    }
}
