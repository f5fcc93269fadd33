use jobboard::board::{BoardView, JobCard};
use jobboard::jobs::JobRecord;
use jobboard::sync::SyncHooks;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A [`BoardView`] that records what it was asked to show.
#[derive(Default)]
pub struct RecordingView {
    pub renders: Mutex<Vec<Vec<JobCard>>>,
    pub details: Mutex<Vec<String>>,
    pub toasts: Mutex<Vec<(String, Duration)>>,
}

#[allow(dead_code)]
impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    pub fn last_render(&self) -> Option<Vec<JobCard>> {
        self.renders.lock().unwrap().last().cloned()
    }

    pub fn toasts(&self) -> Vec<(String, Duration)> {
        self.toasts.lock().unwrap().clone()
    }
}

impl BoardView for RecordingView {
    fn render(&self, cards: &[JobCard]) {
        self.renders.lock().unwrap().push(cards.to_vec());
    }

    fn show_detail(&self, job: &JobRecord) {
        self.details.lock().unwrap().push(job.id.clone());
    }

    fn hide_detail(&self) {}

    fn show_toast(&self, text: &str, duration: Duration) {
        self.toasts
            .lock()
            .unwrap()
            .push((text.to_string(), duration));
    }
}

/// Counts every sync hook invocation.
#[derive(Default)]
pub struct RecordingHooks {
    pub jobs_renders: Mutex<Vec<Vec<JobRecord>>>,
    pub admin_renders: Mutex<usize>,
    pub announcement_renders: Mutex<usize>,
    pub toasts: Mutex<Vec<(String, Duration)>>,
}

#[allow(dead_code)]
impl RecordingHooks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn hooks(self: &Arc<Self>) -> SyncHooks {
        let jobs = self.clone();
        let admin = self.clone();
        let announcement = self.clone();
        let toast = self.clone();
        SyncHooks::new()
            .on_render_jobs(move |list| jobs.jobs_renders.lock().unwrap().push(list.to_vec()))
            .on_render_admin_jobs(move || *admin.admin_renders.lock().unwrap() += 1)
            .on_render_announcement_admin(move || {
                *announcement.announcement_renders.lock().unwrap() += 1
            })
            .on_toast(move |text, duration| {
                toast
                    .toasts
                    .lock()
                    .unwrap()
                    .push((text.to_string(), duration))
            })
    }

    pub fn jobs_render_count(&self) -> usize {
        self.jobs_renders.lock().unwrap().len()
    }

    pub fn admin_render_count(&self) -> usize {
        *self.admin_renders.lock().unwrap()
    }

    pub fn announcement_render_count(&self) -> usize {
        *self.announcement_renders.lock().unwrap()
    }

    pub fn toasts(&self) -> Vec<(String, Duration)> {
        self.toasts.lock().unwrap().clone()
    }
}
