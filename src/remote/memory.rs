//! In-process remote mirror.
//!
//! Keeps the collection in memory and pushes snapshots to subscribers
//! through watch channels. Used for local development and as the remote
//! in tests, where writes and subscriptions can be made to fail.

use super::error::RemoteError;
use super::models::{AnnouncementDocument, JobDocument, RemoteJob};
use super::{AnnouncementStream, JobsStream, RemoteMirror};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

pub struct MemoryMirror {
    jobs: Mutex<BTreeMap<String, JobDocument>>,
    jobs_tx: watch::Sender<Vec<RemoteJob>>,
    announcement_tx: watch::Sender<Option<AnnouncementDocument>>,
    fail_writes: AtomicBool,
    fail_subscriptions: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMirror {
    pub fn new() -> Self {
        let (jobs_tx, _) = watch::channel(Vec::new());
        let (announcement_tx, _) = watch::channel(None);
        Self {
            jobs: Mutex::new(BTreeMap::new()),
            jobs_tx,
            announcement_tx,
            fail_writes: AtomicBool::new(false),
            fail_subscriptions: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Make every following write fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following subscription attempt fail until reset.
    pub fn set_fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    /// Number of writes accepted so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current ordered snapshot of the jobs collection.
    pub fn jobs(&self) -> Vec<RemoteJob> {
        self.jobs_tx.borrow().clone()
    }

    pub fn announcement(&self) -> Option<AnnouncementDocument> {
        self.announcement_tx.borrow().clone()
    }

    fn check_write(&self) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("writes are disabled".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_subscribe(&self) -> Result<(), RemoteError> {
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(
                "subscriptions are disabled".to_string(),
            ));
        }
        Ok(())
    }

    fn modify_jobs<F>(&self, modify: F) -> Result<(), RemoteError>
    where
        F: FnOnce(&mut BTreeMap<String, JobDocument>),
    {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| RemoteError::Unavailable("jobs lock poisoned".to_string()))?;
        modify(&mut jobs);
        self.jobs_tx.send_replace(ordered_snapshot(&jobs));
        Ok(())
    }
}

/// Documents without `createdAt` are left out, like an ordered query would.
fn ordered_snapshot(jobs: &BTreeMap<String, JobDocument>) -> Vec<RemoteJob> {
    let mut snapshot: Vec<RemoteJob> = jobs
        .iter()
        .filter(|(_, document)| document.created_at.is_some())
        .map(|(id, document)| RemoteJob {
            id: id.clone(),
            document: document.clone(),
        })
        .collect();
    snapshot.sort_by(|a, b| b.document.created_at.cmp(&a.document.created_at));
    snapshot
}

fn watch_stream<T>(mut receiver: watch::Receiver<T>) -> BoxStream<'static, Result<T, RemoteError>>
where
    T: Clone + Send + Sync + 'static,
{
    receiver.mark_changed();
    stream::unfold(receiver, |mut receiver| async move {
        receiver.changed().await.ok()?;
        let value = receiver.borrow_and_update().clone();
        Some((Ok(value), receiver))
    })
    .boxed()
}

#[async_trait]
impl RemoteMirror for MemoryMirror {
    async fn watch_jobs(&self) -> Result<JobsStream, RemoteError> {
        self.check_subscribe()?;
        Ok(watch_stream(self.jobs_tx.subscribe()))
    }

    async fn watch_announcement(&self) -> Result<AnnouncementStream, RemoteError> {
        self.check_subscribe()?;
        Ok(watch_stream(self.announcement_tx.subscribe()))
    }

    async fn set_job(&self, id: &str, document: &JobDocument) -> Result<(), RemoteError> {
        self.check_write()?;
        self.modify_jobs(|jobs| {
            jobs.insert(id.to_string(), document.clone());
        })
    }

    async fn delete_job(&self, id: &str) -> Result<(), RemoteError> {
        self.check_write()?;
        self.modify_jobs(|jobs| {
            jobs.remove(id);
        })
    }

    async fn set_announcement(&self, announcement: &AnnouncementDocument) -> Result<(), RemoteError> {
        self.check_write()?;
        self.announcement_tx.send_replace(Some(announcement.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn document(created_at: Option<i64>) -> JobDocument {
        JobDocument {
            raw: Some("Job".to_string()),
            created_at,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_subscription_delivers_current_state_then_changes() {
        let mirror = MemoryMirror::new();
        mirror.set_job("old", &document(Some(1))).await.unwrap();

        let mut jobs = mirror.watch_jobs().await.unwrap();
        let first = jobs.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        mirror.set_job("new", &document(Some(2))).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(5), jobs.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let ids: Vec<_> = second.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_documents_without_created_at_are_not_listed() {
        let mirror = MemoryMirror::new();
        mirror.set_job("dated", &document(Some(5))).await.unwrap();
        mirror.set_job("undated", &document(None)).await.unwrap();

        let ids: Vec<_> = mirror.jobs().into_iter().map(|job| job.id).collect();
        assert_eq!(ids, vec!["dated".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_writes_leave_state_untouched() {
        let mirror = MemoryMirror::new();
        mirror.set_fail_writes(true);

        assert!(mirror.set_job("a", &document(Some(1))).await.is_err());
        assert!(mirror
            .set_announcement(&AnnouncementDocument {
                text: "x".to_string()
            })
            .await
            .is_err());
        assert!(mirror.jobs().is_empty());
        assert_eq!(mirror.announcement(), None);
        assert_eq!(mirror.write_count(), 0);
    }
}
