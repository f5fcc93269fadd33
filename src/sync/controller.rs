use super::hooks::SyncHooks;
use crate::config::RemoteSettings;
use crate::jobs::{mint_job_id, now_millis, JobRecord};
use crate::local_cache::LocalCache;
use crate::metrics;
use crate::remote::{
    self, AnnouncementDocument, AnnouncementStream, InitError, JobDocument, JobsStream,
    RemoteError, RemoteJob, RemoteMirror,
};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub const ANNOUNCEMENT_TOAST: &str = "Announcement updated";
pub const ANNOUNCEMENT_TOAST_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No remote configured.
    Disabled,
    Connecting,
    Live,
    /// Initialization or listener setup failed; behaves like `Disabled`.
    Failed,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Disabled => "disabled",
            SyncState::Connecting => "connecting",
            SyncState::Live => "live",
            SyncState::Failed => "failed",
        }
    }
}

enum RemoteUpdate {
    Jobs(Result<Vec<RemoteJob>, RemoteError>),
    Announcement(Result<Option<AnnouncementDocument>, RemoteError>),
}

/// One tab's sync layer.
///
/// While `Live`, writes go to the remote mirror and reach the local cache
/// through the next snapshot. In every other state they are applied to the
/// local cache directly, firing the same hooks a snapshot would.
pub struct SyncController {
    cache: LocalCache,
    hooks: SyncHooks,
    state: watch::Sender<SyncState>,
    mirror: RwLock<Option<Arc<dyn RemoteMirror>>>,
}

impl SyncController {
    fn new(cache: LocalCache, hooks: SyncHooks, state: SyncState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            cache,
            hooks,
            state,
            mirror: RwLock::new(None),
        }
    }

    /// A local-only controller.
    pub fn disabled(cache: LocalCache, hooks: SyncHooks) -> Arc<Self> {
        info!("Remote sync disabled, running on the local cache only");
        Arc::new(Self::new(cache, hooks, SyncState::Disabled))
    }

    /// Connect to the configured remote, or stay local-only without one.
    pub fn from_settings(
        cache: LocalCache,
        hooks: SyncHooks,
        settings: Option<&RemoteSettings>,
    ) -> Arc<Self> {
        match settings {
            None => Self::disabled(cache, hooks),
            Some(settings) => {
                let settings = settings.clone();
                Self::start(cache, hooks, async move { remote::connect(&settings).await })
            }
        }
    }

    /// Spawn the task that awaits `init`, subscribes to both streams and
    /// applies their snapshots for the rest of the process lifetime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(cache: LocalCache, hooks: SyncHooks, init: F) -> Arc<Self>
    where
        F: Future<Output = Result<Arc<dyn RemoteMirror>, InitError>> + Send + 'static,
    {
        let controller = Arc::new(Self::new(cache, hooks, SyncState::Connecting));
        tokio::spawn(controller.clone().run(init));
        controller
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Wait until initialization has either succeeded or failed.
    pub async fn settled(&self) -> SyncState {
        let mut receiver = self.state.subscribe();
        loop {
            let state = *receiver.borrow_and_update();
            if state != SyncState::Connecting {
                return state;
            }
            if receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    fn set_state(&self, state: SyncState) {
        self.state.send_replace(state);
    }

    fn live_mirror(&self) -> Option<Arc<dyn RemoteMirror>> {
        if self.state() != SyncState::Live {
            return None;
        }
        self.mirror.read().ok().and_then(|mirror| mirror.clone())
    }

    async fn run<F>(self: Arc<Self>, init: F)
    where
        F: Future<Output = Result<Arc<dyn RemoteMirror>, InitError>> + Send + 'static,
    {
        let mirror = match init.await {
            Ok(mirror) => mirror,
            Err(e) => {
                error!("Remote sync initialization failed: {}", e);
                self.set_state(SyncState::Failed);
                return;
            }
        };

        let (jobs, announcement) = match subscribe(mirror.as_ref()).await {
            Ok(streams) => streams,
            Err(e) => {
                error!("Remote sync initialization failed: {}", e);
                self.set_state(SyncState::Failed);
                return;
            }
        };

        if let Ok(mut slot) = self.mirror.write() {
            *slot = Some(mirror);
        }
        self.set_state(SyncState::Live);
        info!("Remote sync is live");

        let mut updates = stream::select(
            jobs.map(RemoteUpdate::Jobs),
            announcement.map(RemoteUpdate::Announcement),
        );
        while let Some(update) = updates.next().await {
            match update {
                RemoteUpdate::Jobs(Ok(documents)) => {
                    self.apply_jobs_snapshot(documents);
                }
                RemoteUpdate::Jobs(Err(e)) => {
                    error!("Jobs listener failed: {}", e);
                }
                RemoteUpdate::Announcement(Ok(document)) => {
                    self.apply_announcement_snapshot(document);
                }
                RemoteUpdate::Announcement(Err(e)) => {
                    error!("Announcement listener failed: {}", e);
                }
            }
        }
        warn!("Remote listeners ended, no further snapshots will be applied");
    }

    /// Replace the cached job list with a full remote snapshot.
    pub fn apply_jobs_snapshot(&self, documents: Vec<RemoteJob>) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = documents.into_iter().map(RemoteJob::into_record).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!("Applying jobs snapshot with {} documents", jobs.len());
        metrics::record_snapshot_applied("jobs");
        self.apply_local_jobs(&jobs);
        jobs
    }

    /// Replace the cached announcement with a remote snapshot.
    pub fn apply_announcement_snapshot(&self, document: Option<AnnouncementDocument>) -> String {
        let text = document.map(|document| document.text).unwrap_or_default();
        debug!("Applying announcement snapshot ({} bytes)", text.len());
        metrics::record_snapshot_applied("announcement");
        self.apply_local_announcement(&text);
        text
    }

    fn apply_local_jobs(&self, jobs: &[JobRecord]) {
        self.cache.set_jobs(jobs);
        self.render_jobs(jobs);
    }

    fn render_jobs(&self, jobs: &[JobRecord]) {
        self.hooks.render_jobs(jobs);
        self.hooks.render_admin_jobs();
    }

    fn apply_local_announcement(&self, text: &str) {
        self.cache.set_announcement(text);
        self.hooks.render_announcement_admin();
        if !text.is_empty() {
            self.hooks
                .show_toast(ANNOUNCEMENT_TOAST, ANNOUNCEMENT_TOAST_DURATION);
        }
    }

    fn upsert_local(&self, job: JobRecord) {
        let jobs = self.cache.edit_jobs(|jobs| {
            match jobs.iter_mut().find(|existing| existing.id == job.id) {
                Some(existing) => *existing = job,
                None => jobs.insert(0, job),
            }
        });
        self.render_jobs(&jobs);
    }

    /// Create or overwrite a job. An empty id is replaced by a fresh one and
    /// a zero `created_at` by the current time.
    pub async fn push_job(&self, job: &JobRecord) -> bool {
        let mut job = job.clone();
        if job.id.is_empty() {
            job.id = mint_job_id();
        }
        self.write_job("push_job", job).await
    }

    /// Overwrite an existing job. Returns `false` without writing when the
    /// job has no id.
    pub async fn update_job(&self, job: &JobRecord) -> bool {
        if job.id.is_empty() {
            warn!("Refusing to update a job without an id");
            return false;
        }
        self.write_job("update_job", job.clone()).await
    }

    async fn write_job(&self, operation: &str, mut job: JobRecord) -> bool {
        if job.created_at == 0 {
            job.created_at = now_millis();
        }

        let Some(mirror) = self.live_mirror() else {
            debug!("{} {} applied to the local cache", operation, job.id);
            self.upsert_local(job);
            return true;
        };

        let document = JobDocument::from_record(&job);
        let result = mirror.set_job(&job.id, &document).await;
        report_remote_write(operation, &job.id, result)
    }

    pub async fn delete_job(&self, job_id: &str) -> bool {
        if job_id.is_empty() {
            warn!("Refusing to delete a job without an id");
            return false;
        }

        let Some(mirror) = self.live_mirror() else {
            debug!("delete_job {} applied to the local cache", job_id);
            let jobs = self.cache.edit_jobs(|jobs| jobs.retain(|job| job.id != job_id));
            self.render_jobs(&jobs);
            return true;
        };

        let result = mirror.delete_job(job_id).await;
        report_remote_write("delete_job", job_id, result)
    }

    pub async fn set_announcement(&self, text: &str) -> bool {
        let Some(mirror) = self.live_mirror() else {
            self.apply_local_announcement(text);
            return true;
        };

        let document = AnnouncementDocument {
            text: text.to_string(),
        };
        let result = mirror.set_announcement(&document).await;
        report_remote_write("set_announcement", "meta/announcement", result)
    }
}

async fn subscribe(
    mirror: &dyn RemoteMirror,
) -> Result<(JobsStream, AnnouncementStream), InitError> {
    let jobs = mirror.watch_jobs().await.map_err(InitError::Subscribe)?;
    let announcement = mirror
        .watch_announcement()
        .await
        .map_err(InitError::Subscribe)?;
    Ok((jobs, announcement))
}

fn report_remote_write(operation: &str, target: &str, result: Result<(), RemoteError>) -> bool {
    match result {
        Ok(()) => {
            debug!("{} {} succeeded", operation, target);
            metrics::record_remote_write(operation, true);
            true
        }
        Err(e) => {
            error!("{} {} failed: {}", operation, target, e);
            metrics::record_remote_write(operation, false);
            false
        }
    }
}
