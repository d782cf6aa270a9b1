use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::api::ChatApi;
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{Credentials, User};

/// The logged-in user, handed explicitly to everything that needs identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}

/// Caches the current user as JSON under `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self { path: dir.as_ref().join(format!("{key}.json")) }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.storage_dir, &config.storage_key)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached session, or `None` when nobody is logged in.
    pub async fn load(&self) -> Result<Option<Session>, ClientError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::storage(&self.path, e)),
        };
        let user: User = serde_json::from_slice(&raw)?;
        Ok(Some(Session::new(user)))
    }

    pub async fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ClientError::storage(dir, e))?;
        }
        let json = serde_json::to_vec_pretty(session.user())?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ClientError::storage(&self.path, e))
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::storage(&self.path, e)),
        }
    }
}

/// Authenticates against the API and caches the resulting session.
pub async fn login<A: ChatApi>(
    api: &A,
    store: &SessionStore,
    username: &str,
    password: &str,
) -> Result<Session, ClientError> {
    let credentials = Credentials { username: username.to_string(), password: password.to_string() };
    let user = api.login(&credentials).await?;
    let session = Session::new(user);
    store.save(&session).await?;
    info!("Logged in as {}", session.username());
    Ok(session)
}

/// Ends the session remotely and removes the cached copy.
/// The local copy is removed even when the remote call fails.
pub async fn logout<A: ChatApi>(api: &A, store: &SessionStore, session: Session) -> Result<(), ClientError> {
    if let Err(e) = api.logout(session.user_id()).await {
        warn!("Remote logout for {} failed: {e}", session.username());
    }
    store.clear().await?;
    info!("Logged out {}", session.username());
    Ok(())
}
