//! The shared remote store every client mirrors.
//!
//! A [`RemoteMirror`] holds a `jobs` collection keyed by job id and a
//! single announcement document, and streams full snapshots of both.

mod error;
mod firestore;
mod firestore_values;
mod memory;
mod models;

pub use error::{InitError, RemoteError};
pub use firestore::{FirebaseApp, FirestoreMirror};
pub use memory::MemoryMirror;
pub use models::{AnnouncementDocument, JobDocument, RemoteJob};

use crate::config::RemoteSettings;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Full snapshots of the jobs collection, ordered by `createdAt` descending.
pub type JobsStream = BoxStream<'static, Result<Vec<RemoteJob>, RemoteError>>;

/// Snapshots of the announcement document; `None` while it does not exist.
pub type AnnouncementStream = BoxStream<'static, Result<Option<AnnouncementDocument>, RemoteError>>;

#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Subscribe to the jobs collection. The current state is delivered first.
    async fn watch_jobs(&self) -> Result<JobsStream, RemoteError>;

    /// Subscribe to the announcement document. The current state is delivered first.
    async fn watch_announcement(&self) -> Result<AnnouncementStream, RemoteError>;

    /// Create or fully overwrite the job document `id`.
    async fn set_job(&self, id: &str, document: &JobDocument) -> Result<(), RemoteError>;

    async fn delete_job(&self, id: &str) -> Result<(), RemoteError>;

    /// Fully overwrite the announcement document.
    async fn set_announcement(&self, announcement: &AnnouncementDocument) -> Result<(), RemoteError>;
}

/// Initialize the configured remote in two phases: the app, then the
/// database handle bound to it.
pub async fn connect(settings: &RemoteSettings) -> Result<Arc<dyn RemoteMirror>, InitError> {
    let app = FirebaseApp::initialize(settings)?;
    let mirror = FirestoreMirror::open(app).await?;
    Ok(Arc::new(mirror))
}
