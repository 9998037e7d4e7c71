//! In-memory document client and state store for sync tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{DocumentError, StoreError};
use crate::integrations::traits::DocumentClient;
use crate::storage::StateStore;
use crate::sync::types::{RawRow, SyncRecord};

#[derive(Default)]
struct DocsState {
    timestamps: HashMap<String, String>,
    rows: HashMap<String, Vec<RawRow>>,
    failing: HashSet<String>,
    calls: Vec<String>,
}

/// Clones share state, so a test keeps a handle after moving one into a processor.
#[derive(Clone, Default)]
pub struct FakeDocs {
    state: Arc<Mutex<DocsState>>,
}

impl FakeDocs {
    pub fn with_document(self, id: &str, modified: &str, rows: Vec<RawRow>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.timestamps.insert(id.into(), modified.into());
            state.rows.insert(id.into(), rows);
        }
        self
    }

    pub fn set_modified(&self, id: &str, modified: &str) {
        self.state
            .lock()
            .unwrap()
            .timestamps
            .insert(id.into(), modified.into());
    }

    pub fn fail(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.into());
    }

    /// `"last_update:<id>"` / `"rows:<id>"` in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl DocumentClient for FakeDocs {
    async fn last_update(&self, document_id: &str) -> Result<String, DocumentError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("last_update:{document_id}"));
        if state.failing.contains(document_id) {
            return Err(DocumentError::Api {
                status: 500,
                message: format!("{document_id} unavailable"),
            });
        }
        state
            .timestamps
            .get(document_id)
            .cloned()
            .ok_or_else(|| DocumentError::Api {
                status: 404,
                message: format!("File not found: {document_id}"),
            })
    }

    async fn rows(
        &self,
        spreadsheet_id: &str,
        _range: &str,
    ) -> Result<Option<Vec<RawRow>>, DocumentError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("rows:{spreadsheet_id}"));
        Ok(state
            .rows
            .get(spreadsheet_id)
            .cloned()
            .filter(|rows| !rows.is_empty()))
    }
}

#[derive(Default)]
struct StoreState {
    records: HashMap<String, SyncRecord>,
    reads: usize,
    writes: usize,
    fail_writes: bool,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub fn with_record(self, key: &str, record: SyncRecord) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .insert(key.into(), record);
        self
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn record(&self, key: &str) -> Option<SyncRecord> {
        self.state.lock().unwrap().records.get(key).cloned()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

#[async_trait]
impl StateStore for FakeStore {
    async fn read(&self, key: &str) -> Result<Option<SyncRecord>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        Ok(state.records.get(key).cloned())
    }

    async fn write(&self, key: &str, record: &SyncRecord) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(StoreError::Api {
                status: 503,
                message: "database unavailable".into(),
            });
        }
        state.writes += 1;
        state.records.insert(key.into(), record.clone());
        Ok(())
    }
}

pub fn row(cells: &[&str]) -> RawRow {
    cells.iter().map(|c| Some(c.to_string())).collect()
}
