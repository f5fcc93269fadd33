//! Job board sync layer
//!
//! A per-tab local cache of job postings and a site announcement, kept in
//! step with a shared remote mirror and with the other tabs of the same
//! profile.

pub mod board;
pub mod config;
pub mod cross_tab;
pub mod jobs;
pub mod local_cache;
pub mod metrics;
pub mod remote;
pub mod sqlite_persistence;
pub mod sync;

// Re-export commonly used types for convenience
pub use board::{BoardView, JobBoard};
pub use jobs::JobRecord;
pub use local_cache::{LocalCache, SqliteStorage};
pub use sync::{SyncController, SyncHooks, SyncState};
