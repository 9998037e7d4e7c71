//! SQLite-backed state store.
//!
//! A local stand-in for the realtime database: same replace-in-full
//! semantics, one row per destination key, `data` kept as JSON text.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::migrations;
use super::StateStore;
use crate::error::StoreError;
use crate::sync::types::{CommunityGroup, SyncRecord};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn read(&self, key: &str) -> Result<Option<SyncRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Locked)?;
        let row: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT last_file_update, data FROM sync_records WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(last_file_update, data)| -> Result<SyncRecord, StoreError> {
            let data = data
                .map(|json| serde_json::from_str::<Option<Vec<CommunityGroup>>>(&json))
                .transpose()?
                .flatten();
            Ok(SyncRecord {
                last_file_update,
                data,
            })
        })
        .transpose()
    }

    async fn write(&self, key: &str, record: &SyncRecord) -> Result<(), StoreError> {
        let data = record.data.as_ref().map(serde_json::to_string).transpose()?;
        let conn = self.conn.lock().map_err(|_| StoreError::Locked)?;
        conn.execute(
            "INSERT OR REPLACE INTO sync_records (key, last_file_update, data)
             VALUES (?1, ?2, ?3)",
            params![key, record.last_file_update, data],
        )?;
        Ok(())
    }
}
