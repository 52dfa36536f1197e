//! Pooled SQLite connections and schema management.

use crate::error::StoreError;
use log::{debug, info};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Current schema version tracked in `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

/// Connections kept for a file-backed database.
const FILE_POOL_SIZE: u32 = 10;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS mentions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category     TEXT    NOT NULL,
    value        TEXT    NOT NULL,
    username     TEXT    NOT NULL DEFAULT '',
    room_name    TEXT    NOT NULL DEFAULT '',
    mention_time INTEGER NOT NULL,
    occurrences  INTEGER NOT NULL CHECK (occurrences >= 1),
    is_bot       INTEGER NOT NULL DEFAULT 0,
    UNIQUE (category, value, username, room_name, mention_time)
);
CREATE INDEX IF NOT EXISTS idx_mentions_category_time
    ON mentions (category, mention_time);
";

/// Cloneable handle to the connection pool shared by every store view.
///
/// Build it once at startup and pass clones to the components that need it.
/// File-backed pools run in WAL mode, so readers proceed alongside a writer.
#[derive(Debug, Clone)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
}

impl SqlitePool {
    /// Open (or create) a database file, creating parent directories.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            let journal: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            debug!("connection initialised (journal_mode={journal})");
            Ok(())
        });
        let pool = Pool::builder().max_size(FILE_POOL_SIZE).build(manager)?;
        info!(
            "opened mention database (path={}, connections={FILE_POOL_SIZE})",
            path.display()
        );
        Self::migrated(pool)
    }

    /// Open a private in-memory database.
    ///
    /// Every in-memory connection is its own database, so the pool holds a
    /// single connection that is never recycled.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())?;
        debug!("opened in-memory mention database");
        Self::migrated(pool)
    }

    fn migrated(pool: Pool<SqliteConnectionManager>) -> Result<Self, StoreError> {
        let pool = Self { pool };
        migrate(&*pool.get()?)?;
        Ok(pool)
    }

    /// Check out a connection for one statement or transaction.
    pub(crate) fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }
}

/// Apply the schema if the database is older than [`SCHEMA_VERSION`].
fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }
    conn.execute_batch(SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    info!("mention schema migrated (from={version}, to={SCHEMA_VERSION})");
    Ok(())
}
