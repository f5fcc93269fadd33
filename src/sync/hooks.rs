use crate::jobs::JobRecord;
use std::time::Duration;

type JobsHook = Box<dyn Fn(&[JobRecord]) + Send + Sync>;
type RefreshHook = Box<dyn Fn() + Send + Sync>;
type ToastHook = Box<dyn Fn(&str, Duration) + Send + Sync>;

/// UI callbacks invoked after the cache has been updated from a snapshot or
/// a local write. Every hook is optional.
#[derive(Default)]
pub struct SyncHooks {
    render_jobs: Option<JobsHook>,
    render_admin_jobs: Option<RefreshHook>,
    render_announcement_admin: Option<RefreshHook>,
    show_toast: Option<ToastHook>,
}

impl SyncHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_render_jobs<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[JobRecord]) + Send + Sync + 'static,
    {
        self.render_jobs = Some(Box::new(hook));
        self
    }

    pub fn on_render_admin_jobs<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.render_admin_jobs = Some(Box::new(hook));
        self
    }

    pub fn on_render_announcement_admin<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.render_announcement_admin = Some(Box::new(hook));
        self
    }

    pub fn on_toast<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.show_toast = Some(Box::new(hook));
        self
    }

    pub(crate) fn render_jobs(&self, jobs: &[JobRecord]) {
        if let Some(hook) = &self.render_jobs {
            hook(jobs);
        }
    }

    pub(crate) fn render_admin_jobs(&self) {
        if let Some(hook) = &self.render_admin_jobs {
            hook();
        }
    }

    pub(crate) fn render_announcement_admin(&self) {
        if let Some(hook) = &self.render_announcement_admin {
            hook();
        }
    }

    pub(crate) fn show_toast(&self, text: &str, duration: Duration) {
        if let Some(hook) = &self.show_toast {
            hook(text, duration);
        }
    }
}
