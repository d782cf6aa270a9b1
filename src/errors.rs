use std::path::PathBuf;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Top-level client error.
/// All variants carry a human-readable message for display/logging.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Configuration ────────────────────────────────────────────────────────
    #[error("Missing or invalid setting '{key}': {message}")]
    Config { key: String, message: String },

    // ── REST transport ───────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Server error: {status} {body}")]
    Server { status: u16, body: String },

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    // ── Real-time channel ────────────────────────────────────────────────────
    #[error("Socket error: {0}")]
    Socket(#[source] Box<tungstenite::Error>),

    #[error("Not subscribed to channel '{channel_id}'")]
    NotSubscribed { channel_id: String },

    // ── Session storage ──────────────────────────────────────────────────────
    #[error("Session storage failed at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No active session, log in first")]
    NoSession,

    // ── View errors ──────────────────────────────────────────────────────────
    #[error("No channel is open")]
    NoActiveChannel,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read upload '{}': {source}", path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Config { key: key.into(), message: message.into() }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClientError::Storage { path: path.into(), source }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Socket(_))
    }

    pub fn is_server(&self) -> bool {
        matches!(self, ClientError::Server { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e)
    }
}

impl From<tungstenite::Error> for ClientError {
    fn from(e: tungstenite::Error) -> Self {
        ClientError::Socket(Box::new(e))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e)
    }
}
