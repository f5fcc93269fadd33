//! Job board records.

pub mod models;

pub use models::{
    default_jobs, derive_title, mint_job_id, normalize_jobs, now_millis, AnnouncementRecord,
    JobRecord, NormalizedJobs, UNTITLED,
};
