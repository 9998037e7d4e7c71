use async_trait::async_trait;

use crate::error::DocumentError;
use crate::sync::types::RawRow;

/// Read access to the spreadsheet documents being synced.
///
/// Implementations are thin wrappers over a remote API: one call, one
/// response or one error. Nothing here retries.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Raw last-modified timestamp of the document, as the service reports it.
    async fn last_update(&self, document_id: &str) -> Result<String, DocumentError>;

    /// Rows of `range` (A1 notation), or `None` when the range holds no values.
    async fn rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Option<Vec<RawRow>>, DocumentError>;
}

#[async_trait]
impl<T: DocumentClient + ?Sized> DocumentClient for Box<T> {
    async fn last_update(&self, document_id: &str) -> Result<String, DocumentError> {
        (**self).last_update(document_id).await
    }

    async fn rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Option<Vec<RawRow>>, DocumentError> {
        (**self).rows(spreadsheet_id, range).await
    }
}
