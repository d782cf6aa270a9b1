use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ClientError;

const DEFAULT_STORAGE_DIR: &str = ".channel-chat";
const DEFAULT_STORAGE_KEY: &str = "chat-app-user";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SOCKET_PATH: &str = "/ws";

/// Client settings, read from the environment (`.env` is loaded by the binary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub server_url: String,
    /// WebSocket URL of the real-time channel server.
    pub socket_url: String,
    pub storage_dir: PathBuf,
    /// File stem under which the current user is cached.
    pub storage_key: String,
    pub http_timeout: Duration,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        let socket_url = derive_socket_url(&server_url);
        Self {
            server_url,
            socket_url,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let server_url = lookup("CHAT_SERVER_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ClientError::config("CHAT_SERVER_URL", "must be set"))?;
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ClientError::config("CHAT_SERVER_URL", "must start with http:// or https://"));
        }

        let mut config = Self::new(server_url);

        if let Some(url) = lookup("CHAT_SOCKET_URL").filter(|v| !v.is_empty()) {
            config.socket_url = url;
        }
        if let Some(dir) = lookup("CHAT_STORAGE_DIR").filter(|v| !v.is_empty()) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("CHAT_STORAGE_KEY").filter(|v| !v.is_empty()) {
            config.storage_key = key;
        }
        if let Some(raw) = lookup("CHAT_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ClientError::config("CHAT_HTTP_TIMEOUT_SECS", format!("'{raw}' is not a number")))?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// `http://host:5001` becomes `ws://host:5001/ws`.
fn derive_socket_url(server_url: &str) -> String {
    let rest = server_url
        .strip_prefix("https://")
        .map(|r| format!("wss://{r}"))
        .or_else(|| server_url.strip_prefix("http://").map(|r| format!("ws://{r}")))
        .unwrap_or_else(|| server_url.to_string());
    format!("{rest}{DEFAULT_SOCKET_PATH}")
}
