//! Documents exchanged with the remote mirror.

use crate::jobs::{AnnouncementRecord, JobRecord};
use serde::{Deserialize, Serialize};

/// Fields of a document in the remote `jobs` collection.
///
/// Every field is optional on the way in: documents written by other
/// clients may miss any of them. Documents written by this crate always
/// carry all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDocument {
    pub title: Option<String>,
    pub raw: Option<String>,
    pub apply: Option<String>,
    pub views: Option<u64>,
    pub applies: Option<u64>,
    pub created_at: Option<i64>,
}

impl JobDocument {
    pub fn from_record(job: &JobRecord) -> Self {
        Self {
            title: Some(job.title.clone()),
            raw: Some(job.raw.clone()),
            apply: Some(job.apply.clone()),
            views: Some(job.views),
            applies: Some(job.applies),
            created_at: Some(job.created_at),
        }
    }
}

/// A job document together with its key in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteJob {
    pub id: String,
    pub document: JobDocument,
}

impl RemoteJob {
    /// Normalize into a record: missing strings become empty, missing numbers 0.
    pub fn into_record(self) -> JobRecord {
        let document = self.document;
        JobRecord {
            id: self.id,
            title: document.title.unwrap_or_default(),
            raw: document.raw.unwrap_or_default(),
            apply: document.apply.unwrap_or_default(),
            views: document.views.unwrap_or(0),
            applies: document.applies.unwrap_or(0),
            created_at: document.created_at.unwrap_or(0),
        }
    }
}

/// The announcement document as stored remotely.
pub type AnnouncementDocument = AnnouncementRecord;
