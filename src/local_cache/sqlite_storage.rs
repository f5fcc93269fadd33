use super::schema::STORAGE_VERSIONED_SCHEMAS;
use super::{KeyValueStorage, StorageChange};
use crate::sqlite_persistence::open_versioned;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// SQLite-backed storage. Every opened handle is a separate tab.
///
/// Handles opened on the same file (from this process or another one) see
/// each other's writes; [`KeyValueStorage::foreign_changes_since`] reports
/// only the writes of the other handles.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    path: PathBuf,
    writer_id: String,
    /// `(data_version, revision)` of the last foreign-change query.
    last_poll: Mutex<Option<(i64, i64)>>,
}

impl SqliteStorage {
    pub const FILE_NAME: &'static str = "storage.db";

    /// Open the storage file of a profile directory, creating both if needed.
    pub fn open_profile<P: AsRef<Path>>(profile_dir: P) -> Result<Self> {
        let profile_dir = profile_dir.as_ref();
        std::fs::create_dir_all(profile_dir)
            .with_context(|| format!("Failed to create profile directory {:?}", profile_dir))?;
        Self::open(profile_dir.join(Self::FILE_NAME))
    }

    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let conn = open_versioned(&path, STORAGE_VERSIONED_SCHEMAS, "storage")?;
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get(0))?;

        let writer_id = Uuid::new_v4().to_string();
        debug!(
            "Opened storage handle {} at {:?} (journal_mode={})",
            writer_id, path, journal_mode
        );

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            writer_id,
            last_poll: Mutex::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identity of this handle as recorded next to the values it writes.
    pub fn writer_id(&self) -> &str {
        &self.writer_id
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Storage connection lock poisoned"))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM storage_items WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO storage_items (key, value, revision, writer, updated_at)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(revision), 0) + 1 FROM storage_items), ?3,
                     cast(strftime('%s','now') as int))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = excluded.revision,
                writer = excluded.writer,
                updated_at = excluded.updated_at",
            params![key, value, self.writer_id],
        )
        .with_context(|| format!("Failed to store key {}", key))?;
        Ok(())
    }

    fn current_revision(&self) -> Result<i64> {
        let conn = self.conn()?;
        let revision: Option<i64> =
            conn.query_row("SELECT MAX(revision) FROM storage_items", [], |row| {
                row.get(0)
            })?;
        Ok(revision.unwrap_or(0))
    }

    fn foreign_changes_since(&self, revision: i64) -> Result<Vec<StorageChange>> {
        let conn = self.conn()?;

        // data_version only moves when another connection commits, so an
        // unchanged value means there is nothing new to report.
        let data_version: i64 = conn.query_row("PRAGMA data_version;", [], |row| row.get(0))?;
        {
            let mut last_poll = self
                .last_poll
                .lock()
                .map_err(|_| anyhow!("Storage poll lock poisoned"))?;
            if *last_poll == Some((data_version, revision)) {
                return Ok(Vec::new());
            }
            *last_poll = Some((data_version, revision));
        }

        let mut stmt = conn.prepare(
            "SELECT key, value, revision FROM storage_items
             WHERE revision > ?1 AND writer != ?2
             ORDER BY revision ASC",
        )?;
        let changes = stmt
            .query_map(params![revision, self.writer_id], |row| {
                Ok(StorageChange {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    revision: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(changes)
    }
}
