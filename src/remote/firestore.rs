//! Remote mirror backed by the Firestore REST API.
//!
//! The REST surface has no push channel, so live updates are emulated by
//! polling: each subscription re-reads its document (or query) every
//! `poll_interval` and yields a snapshot only when it differs from the
//! previous one.

use super::error::{InitError, RemoteError};
use super::firestore_values::{self as values, Fields};
use super::models::{AnnouncementDocument, JobDocument, RemoteJob};
use super::{AnnouncementStream, JobsStream, RemoteMirror};
use crate::config::RemoteSettings;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

const JOBS_COLLECTION: &str = "jobs";
const ANNOUNCEMENT_DOCUMENT: &str = "meta/announcement";

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Fields,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<Document>,
}

/// The initialized app: a configured HTTP client bound to one project.
pub struct FirebaseApp {
    client: reqwest::Client,
    documents_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl FirebaseApp {
    /// First initialization phase: validate the settings and build the client.
    pub fn initialize(settings: &RemoteSettings) -> Result<Self, InitError> {
        let project_id = settings.project_id.trim();
        if project_id.is_empty() {
            return Err(InitError::InvalidConfig(
                "project_id must not be empty".to_string(),
            ));
        }
        if !project_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(InitError::InvalidConfig(format!(
                "project_id {:?} may only contain lowercase letters, digits and '-'",
                project_id
            )));
        }
        if settings.poll_interval.is_zero() {
            return Err(InitError::InvalidConfig(
                "poll interval must be positive".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| InitError::App(e.to_string()))?;

        let base_url = settings.base_url.trim_end_matches('/');
        let documents_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            base_url, project_id
        );

        Ok(Self {
            client,
            documents_url,
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            poll_interval: settings.poll_interval,
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder,
        }
    }

    fn document_url(&self, path: &str) -> String {
        format!("{}/{}", self.documents_url, path)
    }

    fn job_path(id: &str) -> String {
        format!("{}/{}", JOBS_COLLECTION, urlencoding::encode(id))
    }

    async fn get_document(&self, path: &str) -> Result<Option<Document>, RemoteError> {
        let response = self
            .request(Method::GET, self.document_url(path))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Full overwrite of a document, creating it if needed.
    async fn put_document(&self, path: &str, fields: Fields) -> Result<(), RemoteError> {
        let response = self
            .request(Method::PATCH, self.document_url(path))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }

    async fn delete_document(&self, path: &str) -> Result<(), RemoteError> {
        let response = self
            .request(Method::DELETE, self.document_url(path))
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }

    /// All job documents ordered by `createdAt` descending.
    ///
    /// The ordering excludes documents without a `createdAt` field.
    async fn query_jobs(&self) -> Result<Vec<RemoteJob>, RemoteError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": JOBS_COLLECTION }],
                "orderBy": [{
                    "field": { "fieldPath": "createdAt" },
                    "direction": "DESCENDING"
                }]
            }
        });
        let response = self
            .request(Method::POST, format!("{}:runQuery", self.documents_url))
            .json(&body)
            .send()
            .await?;
        let items: Vec<RunQueryItem> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|document| RemoteJob {
                id: values::document_id(&document.name).to_string(),
                document: values::job_document(&document.fields),
            })
            .collect())
    }

    async fn read_announcement(&self) -> Result<Option<AnnouncementDocument>, RemoteError> {
        Ok(self
            .get_document(ANNOUNCEMENT_DOCUMENT)
            .await?
            .map(|document| values::announcement_document(&document.fields)))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// [`RemoteMirror`] talking to a Firestore database.
pub struct FirestoreMirror {
    app: Arc<FirebaseApp>,
}

impl FirestoreMirror {
    /// Second initialization phase: bind the database handle to an
    /// initialized app and check that it is reachable.
    pub async fn open(app: FirebaseApp) -> Result<Self, InitError> {
        app.read_announcement().await.map_err(InitError::Database)?;
        info!("Connected to Firestore at {}", app.documents_url);
        Ok(Self { app: Arc::new(app) })
    }
}

#[async_trait]
impl RemoteMirror for FirestoreMirror {
    async fn watch_jobs(&self) -> Result<JobsStream, RemoteError> {
        let app = self.app.clone();
        let initial = app.query_jobs().await?;
        Ok(poll_changes(
            self.app.poll_interval,
            initial,
            move || {
                let app = app.clone();
                async move { app.query_jobs().await }
            },
        ))
    }

    async fn watch_announcement(&self) -> Result<AnnouncementStream, RemoteError> {
        let app = self.app.clone();
        let initial = app.read_announcement().await?;
        Ok(poll_changes(
            self.app.poll_interval,
            initial,
            move || {
                let app = app.clone();
                async move { app.read_announcement().await }
            },
        ))
    }

    async fn set_job(&self, id: &str, document: &JobDocument) -> Result<(), RemoteError> {
        debug!("Writing job {} to Firestore", id);
        self.app
            .put_document(&FirebaseApp::job_path(id), values::job_fields(document))
            .await
    }

    async fn delete_job(&self, id: &str) -> Result<(), RemoteError> {
        debug!("Deleting job {} from Firestore", id);
        self.app
            .delete_document(&FirebaseApp::job_path(id))
            .await
    }

    async fn set_announcement(&self, announcement: &AnnouncementDocument) -> Result<(), RemoteError> {
        self.app
            .put_document(
                ANNOUNCEMENT_DOCUMENT,
                values::announcement_fields(announcement),
            )
            .await
    }
}

struct PollState<T, F> {
    fetch: F,
    pending: Option<T>,
    last: Option<T>,
    ticker: Interval,
    failed: bool,
}

/// Stream `initial`, then every fetched value that differs from the last
/// one. Transient fetch failures are logged and polling carries on; a final
/// one is yielded once and ends the stream.
fn poll_changes<T, F, Fut>(
    interval: Duration,
    initial: T,
    fetch: F,
) -> BoxStream<'static, Result<T, RemoteError>>
where
    T: Clone + PartialEq + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, RemoteError>> + Send,
{
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = PollState {
        fetch,
        pending: Some(initial),
        last: None,
        ticker,
        failed: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.failed {
            return None;
        }
        if let Some(value) = state.pending.take() {
            state.last = Some(value.clone());
            return Some((Ok(value), state));
        }
        loop {
            state.ticker.tick().await;
            match (state.fetch)().await {
                Ok(value) if state.last.as_ref() == Some(&value) => continue,
                Ok(value) => {
                    state.last = Some(value.clone());
                    return Some((Ok(value), state));
                }
                Err(e) if e.is_transient() => {
                    warn!("Remote poll failed, retrying on the next tick: {}", e);
                    continue;
                }
                Err(e) => {
                    state.failed = true;
                    return Some((Err(e), state));
                }
            }
        }
    })
    .boxed()
}
