use jobboard::jobs::{derive_title, JobRecord};
use jobboard::local_cache::{LocalCache, SqliteStorage};
use jobboard::remote::{JobDocument, RemoteJob};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A profile directory that tabs can be opened on.
pub struct TestProfile {
    dir: TempDir,
}

/// One storage handle on a [`TestProfile`].
pub struct TestTab {
    pub storage: Arc<SqliteStorage>,
    pub cache: LocalCache,
}

impl TestProfile {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn open_tab(&self) -> TestTab {
        let storage =
            Arc::new(SqliteStorage::open_profile(self.dir.path()).expect("Failed to open storage"));
        TestTab {
            cache: LocalCache::new(storage.clone()),
            storage,
        }
    }
}

#[allow(dead_code)]
pub fn job(id: &str, raw: &str, created_at: i64) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: derive_title(raw),
        raw: raw.to_string(),
        apply: String::new(),
        views: 0,
        applies: 0,
        created_at,
    }
}

#[allow(dead_code)]
pub fn remote_job(id: &str, raw: &str, created_at: i64) -> RemoteJob {
    RemoteJob {
        id: id.to_string(),
        document: JobDocument {
            title: Some(derive_title(raw)),
            raw: Some(raw.to_string()),
            created_at: Some(created_at),
            ..Default::default()
        },
    }
}

/// Poll `condition` until it holds, failing the test after five seconds.
#[allow(dead_code)]
pub async fn wait_until<F>(what: &str, mut condition: F)
where
    F: FnMut() -> bool,
{
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "Timed out waiting for {}", what);
}
