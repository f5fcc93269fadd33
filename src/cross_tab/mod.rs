//! Cross-tab change propagation.
//!
//! Every tab polls its own storage handle for values committed by other
//! handles of the same profile and fans them out as [`StorageEvent`]s.
//! A tab never sees events for its own writes.

use crate::local_cache::KeyValueStorage;
use crate::metrics;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const EVENTS_CHANNEL_CAPACITY: usize = 64;

/// A storage key changed in another tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: String,
}

/// Watches one storage handle for changes committed by other tabs.
pub struct CrossTabWatcher {
    storage: Arc<dyn KeyValueStorage>,
    last_revision: Mutex<i64>,
    events: broadcast::Sender<StorageEvent>,
}

impl CrossTabWatcher {
    /// Start watching from the current revision; earlier writes are not reported.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let last_revision = storage.current_revision().unwrap_or_else(|e| {
            warn!("Failed to read storage revision, watching from 0: {:#}", e);
            0
        });
        let (events, _) = broadcast::channel(EVENTS_CHANNEL_CAPACITY);
        Self {
            storage,
            last_revision: Mutex::new(last_revision),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    /// Check storage once, broadcast and return any foreign changes.
    pub fn poll(&self) -> Vec<StorageEvent> {
        let Ok(mut last_revision) = self.last_revision.lock() else {
            warn!("Cross-tab watcher lock poisoned");
            return Vec::new();
        };

        let changes = match self.storage.foreign_changes_since(*last_revision) {
            Ok(changes) => changes,
            Err(e) => {
                warn!("Failed to poll storage for cross-tab changes: {:#}", e);
                return Vec::new();
            }
        };

        let mut events = Vec::with_capacity(changes.len());
        for change in changes {
            *last_revision = (*last_revision).max(change.revision);
            debug!(
                "Storage key {} changed in another tab (revision {})",
                change.key, change.revision
            );
            metrics::record_cross_tab_event();

            let event = StorageEvent {
                key: change.key,
                new_value: change.value,
            };
            // No subscribers is fine, the event is still returned
            let _ = self.events.send(event.clone());
            events.push(event);
        }
        events
    }

    /// Poll forever at the given interval.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.poll();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_cache::SqliteStorage;
    use tempfile::TempDir;

    #[test]
    fn test_poll_reports_only_other_tabs() {
        let temp_dir = TempDir::new().unwrap();
        let tab_a = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());
        let tab_b = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());
        let watcher = CrossTabWatcher::new(tab_a.clone());

        tab_a.set_item("jobs", "[]").unwrap();
        assert!(watcher.poll().is_empty());

        tab_b.set_item("announcement", "Walk-in on Monday").unwrap();
        let events = watcher.poll();
        assert_eq!(
            events,
            vec![StorageEvent {
                key: "announcement".to_string(),
                new_value: "Walk-in on Monday".to_string(),
            }]
        );

        // Already delivered
        assert!(watcher.poll().is_empty());
    }

    #[test]
    fn test_writes_before_watching_are_not_reported() {
        let temp_dir = TempDir::new().unwrap();
        let tab_a = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());
        let tab_b = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());

        tab_b.set_item("jobs", "[]").unwrap();
        let watcher = CrossTabWatcher::new(tab_a);
        assert!(watcher.poll().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let temp_dir = TempDir::new().unwrap();
        let tab_a = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());
        let tab_b = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());
        let watcher = Arc::new(CrossTabWatcher::new(tab_a));
        let mut events = watcher.subscribe();
        let _handle = watcher.clone().spawn(Duration::from_millis(10));

        tab_b.set_item("jobs", "[]").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("Timed out waiting for storage event")
            .unwrap();
        assert_eq!(event.key, "jobs");
    }
}
