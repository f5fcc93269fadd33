use super::KeyValueStorage;
use crate::jobs::{default_jobs, normalize_jobs, JobRecord};
use crate::metrics;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub const JOBS_KEY: &str = "jobs";
pub const ANNOUNCEMENT_KEY: &str = "announcement";
pub const DEFAULT_ANNOUNCEMENT: &str = "No announcements currently.";

/// The jobs list and announcement, persisted in a [`KeyValueStorage`].
///
/// Storage failures never reach the caller: they are logged and the
/// in-memory value is used instead, so a tab keeps working without
/// persistence.
///
/// Clones share one jobs lock, so read-modify-write updates made through
/// any clone are serialized with each other and with snapshot replacement.
#[derive(Clone)]
pub struct LocalCache {
    storage: Arc<dyn KeyValueStorage>,
    jobs_lock: Arc<Mutex<()>>,
}

impl LocalCache {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            jobs_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Stored jobs, normalized, or the built-in default list when nothing
    /// (usable) is stored.
    ///
    /// Records missing an id get one minted; if that happened the repaired
    /// list is written back immediately.
    pub fn get_jobs(&self) -> Vec<JobRecord> {
        let _guard = self.lock_jobs();
        self.load_jobs()
    }

    fn load_jobs(&self) -> Vec<JobRecord> {
        let Some(stored) = self.read(JOBS_KEY) else {
            return default_jobs();
        };

        let values = match serde_json::from_str::<Value>(&stored) {
            Ok(Value::Array(values)) => values,
            Ok(Value::Null) => return default_jobs(),
            Ok(other) => {
                warn!(
                    "Stored jobs value is not a list ({}), ignoring it",
                    json_type_name(&other)
                );
                return default_jobs();
            }
            Err(e) => {
                warn!("Stored jobs value is not valid JSON, ignoring it: {}", e);
                return default_jobs();
            }
        };

        let normalized = normalize_jobs(&values);
        if normalized.repaired {
            debug!("Writing back {} repaired job records", normalized.jobs.len());
            self.store_jobs(&normalized.jobs);
        }
        normalized.jobs
    }

    /// Replace the stored job list.
    pub fn set_jobs(&self, jobs: &[JobRecord]) {
        let _guard = self.lock_jobs();
        self.store_jobs(jobs);
    }

    /// Load the job list, let `edit` change it and store the result, with no
    /// other update through this cache in between.
    pub fn edit_jobs<F>(&self, edit: F) -> Vec<JobRecord>
    where
        F: FnOnce(&mut Vec<JobRecord>),
    {
        let _guard = self.lock_jobs();
        let mut jobs = self.load_jobs();
        edit(&mut jobs);
        self.store_jobs(&jobs);
        jobs
    }

    fn store_jobs(&self, jobs: &[JobRecord]) {
        match serde_json::to_string(jobs) {
            Ok(json) => self.write(JOBS_KEY, &json),
            Err(e) => warn!("Failed to serialize jobs: {}", e),
        }
    }

    /// Stored announcement, or [`DEFAULT_ANNOUNCEMENT`] when it is absent or empty.
    pub fn get_announcement(&self) -> String {
        self.raw_announcement()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_ANNOUNCEMENT.to_string())
    }

    /// Stored announcement verbatim, if any.
    pub fn raw_announcement(&self) -> Option<String> {
        self.read(ANNOUNCEMENT_KEY)
    }

    pub fn set_announcement(&self, text: &str) {
        self.write(ANNOUNCEMENT_KEY, text);
    }

    /// Apply `update` to the job with the given id and persist the list.
    ///
    /// Returns the updated record, or `None` if no job has that id.
    pub fn update_job<F>(&self, id: &str, update: F) -> Option<JobRecord>
    where
        F: FnOnce(&mut JobRecord),
    {
        let _guard = self.lock_jobs();
        let mut jobs = self.load_jobs();
        let job = jobs.iter_mut().find(|job| job.id == id)?;
        update(job);
        let updated = job.clone();
        self.store_jobs(&jobs);
        Some(updated)
    }

    fn lock_jobs(&self) -> MutexGuard<'_, ()> {
        self.jobs_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {} from local storage: {:#}", key, e);
                metrics::record_storage_failure("read");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            warn!("Failed to write {} to local storage: {:#}", key, e);
            metrics::record_storage_failure("write");
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
