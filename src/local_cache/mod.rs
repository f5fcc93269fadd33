//! Durable, synchronous key/value cache scoped to a profile directory.
//!
//! The cache itself ([`LocalCache`]) knows about jobs and the announcement;
//! the storage below it ([`KeyValueStorage`]) only knows keys, string values
//! and which handle wrote them, which is what cross-tab propagation needs.

mod cache;
mod schema;
mod sqlite_storage;

pub use cache::{LocalCache, ANNOUNCEMENT_KEY, DEFAULT_ANNOUNCEMENT, JOBS_KEY};
pub use sqlite_storage::SqliteStorage;

use anyhow::Result;

/// A value committed to storage by some handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    pub value: String,
    pub revision: i64,
}

/// Key/value persistence shared by every tab of one profile.
///
/// Each instance is one tab's handle onto the shared storage. Writes made
/// through a handle are never reported back to that same handle by
/// [`KeyValueStorage::foreign_changes_since`].
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the whole value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Highest revision committed so far by any handle.
    fn current_revision(&self) -> Result<i64>;

    /// Latest values written by other handles after `revision`, oldest first.
    fn foreign_changes_since(&self, revision: i64) -> Result<Vec<StorageChange>>;
}
