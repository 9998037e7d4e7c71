//! Schema migrations for the local SQLite state store.
//!
//! Each entry in [`MIGRATIONS`] runs once, in order, inside its own
//! transaction; `schema_version` holds the last one applied.

use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};

/// `(version, sql)` pairs, ascending.
const MIGRATIONS: &[(i32, &str)] = &[
    // One row per destination key.
    (
        1,
        "CREATE TABLE IF NOT EXISTS sync_records (
            key              TEXT PRIMARY KEY,
            last_file_update TEXT NOT NULL,
            data             TEXT
        );",
    ),
];

/// Version a fully migrated database reports.
pub const SCHEMA_VERSION: i32 = 1;

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// # Errors
/// Returns an error if any migration fails; earlier ones stay applied.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let current = get_schema_version(conn)?;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        apply(conn, version, sql)?;
    }
    Ok(())
}

/// 0 for a database no migration has touched.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    Ok(conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0))
}

fn apply(conn: &Connection, version: i32, sql: &str) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    tx.commit()
}
