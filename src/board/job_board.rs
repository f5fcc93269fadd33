use super::card::JobCard;
use crate::cross_tab::StorageEvent;
use crate::jobs::JobRecord;
use crate::local_cache::{LocalCache, ANNOUNCEMENT_KEY, JOBS_KEY};
use crate::sync::{SyncController, SyncHooks};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Where a board draws itself.
pub trait BoardView: Send + Sync {
    fn render(&self, cards: &[JobCard]);
    fn show_detail(&self, job: &JobRecord);
    fn hide_detail(&self);
    fn show_toast(&self, text: &str, duration: Duration);
}

/// One tab's job list: renders the cache, tracks the open job and counts
/// views and applies.
pub struct JobBoard {
    cache: LocalCache,
    view: Arc<dyn BoardView>,
    sync: Option<Arc<SyncController>>,
    sync_counters: bool,
    open_job_id: Mutex<Option<String>>,
}

impl JobBoard {
    pub fn new(cache: LocalCache, view: Arc<dyn BoardView>) -> Self {
        Self {
            cache,
            view,
            sync: None,
            sync_counters: false,
            open_job_id: Mutex::new(None),
        }
    }

    /// Attach a sync controller. With `sync_counters` set, view and apply
    /// counts are also written to the remote.
    pub fn with_sync(mut self, controller: Arc<SyncController>, sync_counters: bool) -> Self {
        self.sync = Some(controller);
        self.sync_counters = sync_counters;
        self
    }

    /// Hooks that route sync callbacks to `view`.
    pub fn view_hooks(view: Arc<dyn BoardView>) -> SyncHooks {
        let render_view = view.clone();
        SyncHooks::new()
            .on_render_jobs(move |jobs| {
                let cards: Vec<JobCard> = jobs.iter().map(JobCard::from_job).collect();
                render_view.render(&cards);
            })
            .on_toast(move |text, duration| view.show_toast(text, duration))
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn render(&self, jobs: &[JobRecord]) {
        let cards: Vec<JobCard> = jobs.iter().map(JobCard::from_job).collect();
        self.view.render(&cards);
    }

    /// Render every cached job.
    pub fn refresh(&self) -> Vec<JobRecord> {
        let jobs = self.cache.get_jobs();
        self.render(&jobs);
        jobs
    }

    /// Render the cached jobs matching `query`.
    pub fn search(&self, query: &str) -> Vec<JobRecord> {
        let jobs: Vec<JobRecord> = self
            .cache
            .get_jobs()
            .into_iter()
            .filter(|job| job.matches_query(query))
            .collect();
        self.render(&jobs);
        jobs
    }

    pub fn find_job(&self, id: &str) -> Option<JobRecord> {
        self.cache.get_jobs().into_iter().find(|job| job.id == id)
    }

    pub fn open_job_id(&self) -> Option<String> {
        self.open_job_id.lock().ok().and_then(|id| id.clone())
    }

    fn set_open_job_id(&self, id: Option<String>) {
        if let Ok(mut open) = self.open_job_id.lock() {
            *open = id;
        }
    }

    /// Show a job's details and count the view.
    ///
    /// Returns the updated record, or `None` if the job is no longer cached.
    pub async fn open_job(&self, job: &JobRecord) -> Option<JobRecord> {
        self.view.show_detail(job);
        self.set_open_job_id(Some(job.id.clone()));
        self.bump_counter(&job.id, |job| job.views = job.views.saturating_add(1))
            .await
    }

    /// Count an apply on the open job. Does nothing when no job is open.
    pub async fn apply_clicked(&self) -> Option<JobRecord> {
        let id = self.open_job_id()?;
        self.bump_counter(&id, |job| job.applies = job.applies.saturating_add(1))
            .await
    }

    pub fn close_detail(&self) {
        self.view.hide_detail();
        self.set_open_job_id(None);
    }

    async fn bump_counter<F>(&self, id: &str, bump: F) -> Option<JobRecord>
    where
        F: FnOnce(&mut JobRecord),
    {
        let Some(updated) = self.cache.update_job(id, bump) else {
            debug!("Job {} is not cached, counter unchanged", id);
            return None;
        };
        self.refresh();

        if self.sync_counters {
            if let Some(sync) = &self.sync {
                if !sync.update_job(&updated).await {
                    warn!("Failed to sync counters of job {}", id);
                }
            }
        }
        Some(updated)
    }

    pub fn show_announcement(&self) {
        self.view
            .show_toast(&self.cache.get_announcement(), TOAST_DURATION);
    }

    /// React to a change made in another tab.
    pub fn handle_storage_event(&self, event: &StorageEvent) {
        match event.key.as_str() {
            JOBS_KEY => {
                self.refresh();
            }
            ANNOUNCEMENT_KEY if !event.new_value.is_empty() => {
                self.view.show_toast(&event.new_value, TOAST_DURATION);
            }
            _ => {}
        }
    }

    /// Apply storage events from other tabs until the channel closes.
    pub fn spawn_cross_tab(
        self: Arc<Self>,
        mut events: broadcast::Receiver<StorageEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle_storage_event(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} storage events, re-rendering", skipped);
                        self.refresh();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_cache::SqliteStorage;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingView {
        renders: Mutex<Vec<Vec<JobCard>>>,
        toasts: Mutex<Vec<String>>,
        details: Mutex<Vec<String>>,
    }

    impl BoardView for RecordingView {
        fn render(&self, cards: &[JobCard]) {
            self.renders.lock().unwrap().push(cards.to_vec());
        }
        fn show_detail(&self, job: &JobRecord) {
            self.details.lock().unwrap().push(job.id.clone());
        }
        fn hide_detail(&self) {}
        fn show_toast(&self, text: &str, _duration: Duration) {
            self.toasts.lock().unwrap().push(text.to_string());
        }
    }

    fn create_board() -> (JobBoard, Arc<RecordingView>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(SqliteStorage::open_profile(temp_dir.path()).unwrap());
        let view = Arc::new(RecordingView::default());
        let board = JobBoard::new(LocalCache::new(storage), view.clone());
        (board, view, temp_dir)
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (board, view, _temp_dir) = create_board();
        board.cache().set_jobs(&[
            JobRecord::new("Rust Developer\nRemote", ""),
            JobRecord::new("Accountant", ""),
        ]);

        let found = board.search("rUST");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Rust Developer");
        assert_eq!(view.renders.lock().unwrap().last().unwrap().len(), 1);

        assert_eq!(board.search("").len(), 2);
    }

    #[tokio::test]
    async fn test_apply_without_open_job_is_noop() {
        let (board, view, _temp_dir) = create_board();
        assert!(board.apply_clicked().await.is_none());
        assert!(view.renders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_forgets_open_job() {
        let (board, view, _temp_dir) = create_board();
        let job = board.refresh().remove(0);

        board.open_job(&job).await.unwrap();
        assert_eq!(board.open_job_id(), Some(job.id.clone()));
        assert_eq!(*view.details.lock().unwrap(), vec![job.id.clone()]);

        board.close_detail();
        assert_eq!(board.open_job_id(), None);
        assert!(board.apply_clicked().await.is_none());
    }

    #[test]
    fn test_empty_announcement_event_is_ignored() {
        let (board, view, _temp_dir) = create_board();
        board.handle_storage_event(&StorageEvent {
            key: ANNOUNCEMENT_KEY.to_string(),
            new_value: String::new(),
        });
        board.handle_storage_event(&StorageEvent {
            key: ANNOUNCEMENT_KEY.to_string(),
            new_value: "Walk-in tomorrow".to_string(),
        });
        assert_eq!(
            *view.toasts.lock().unwrap(),
            vec!["Walk-in tomorrow".to_string()]
        );
    }
}
