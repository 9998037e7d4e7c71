//! Conditional sync of a single target.

use crate::error::Result;
use crate::integrations::traits::DocumentClient;
use crate::storage::StateStore;
use crate::sync::normalize::normalize;
use crate::sync::types::{SyncRecord, SyncTarget};
use crate::sync::watermark::needs_update;

/// Range read from every sheet unless configured otherwise.
pub const DEFAULT_RANGE: &str = "C2:J";

/// Compares a document's modified time with the stored watermark and
/// rewrites the stored record when the document is newer.
pub struct SyncProcessor<D, S> {
    docs: D,
    store: S,
    range: String,
}

impl<D: DocumentClient, S: StateStore> SyncProcessor<D, S> {
    pub fn new(docs: D, store: S) -> Self {
        Self {
            docs,
            store,
            range: DEFAULT_RANGE.to_string(),
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Sync one target. Returns whether a new record was written.
    ///
    /// Makes one store read, one timestamp fetch, and on change one row
    /// fetch plus one store write. Errors from either side propagate as is.
    pub async fn process_item(&self, target: &SyncTarget) -> Result<bool> {
        let current = self.store.read(&target.destination_key).await?;
        let last_update = self.docs.last_update(&target.source_document_id).await?;

        if !needs_update(current.as_ref(), &last_update) {
            return Ok(false);
        }

        let data = self
            .docs
            .rows(&target.source_document_id, &self.range)
            .await?
            .filter(|rows| !rows.is_empty())
            .map(|rows| normalize(&rows));

        let record = SyncRecord {
            last_file_update: last_update,
            data,
        };
        self.store.write(&target.destination_key, &record).await?;
        Ok(true)
    }
}
