use anyhow::{bail, Result};
use jobboard::local_cache::{KeyValueStorage, StorageChange};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A [`KeyValueStorage`] whose writes always fail.
///
/// Reads return the seeded values, or fail too when `fail_reads` is set.
#[derive(Default)]
pub struct FailingStorage {
    items: Mutex<HashMap<String, String>>,
    fail_reads: bool,
    failed_writes: AtomicUsize,
}

#[allow(dead_code)]
impl FailingStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fails every read and write.
    pub fn unreadable() -> Arc<Self> {
        Arc::new(Self {
            fail_reads: true,
            ..Self::default()
        })
    }

    pub fn seeded(key: &str, value: &str) -> Arc<Self> {
        let storage = Self::default();
        storage
            .items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Arc::new(storage)
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStorage for FailingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            bail!("disk I/O error reading {}", key);
        }
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<()> {
        self.failed_writes.fetch_add(1, Ordering::SeqCst);
        bail!("database or disk is full writing {}", key)
    }

    fn current_revision(&self) -> Result<i64> {
        Ok(0)
    }

    fn foreign_changes_since(&self, _revision: i64) -> Result<Vec<StorageChange>> {
        Ok(Vec::new())
    }
}
