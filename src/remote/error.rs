use thiserror::Error;

/// A remote read, write or subscription failed.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Whether retrying the same request later may succeed. Only client-side
    /// rejections other than rate limiting are final.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Rejected { status, .. } => *status == 429 || *status >= 500,
            _ => true,
        }
    }
}

/// Bringing the remote mirror up failed; the sync layer stays local-only.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfig(String),

    #[error("App initialization failed: {0}")]
    App(String),

    #[error("Database initialization failed: {0}")]
    Database(#[source] RemoteError),

    #[error("Listener setup failed: {0}")]
    Subscribe(#[source] RemoteError),
}
