//! Cached bearer token for the image host.
//!
//! A single token is stored at a time. It is never checked proactively: the
//! upload path discovers an expired token through a 401 and asks the provider
//! to regenerate it.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{errors::Error, host::ImageHost, utils::iso_timestamp_utc, Result};

/// Opaque bearer token issued by the image host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Durable home of the single cached credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when nothing is cached yet.
    async fn load(&self) -> Result<Option<Credential>>;

    /// Replace the cached credential.
    async fn save(&self, credential: &Credential) -> Result<()>;
}

// ============== File store ==============

#[derive(Debug, Serialize, Deserialize)]
struct CredentialRecord {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON file holding `{ "token": ... }`.
///
/// Writes go through a temp file in the same directory followed by a rename,
/// so concurrent readers see either the old record or the new one.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "token.json".to_string());
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = format!(".{name}.tmp.{}.{n}", std::process::id());
        match parent_dir(&self.path) {
            Some(dir) => dir.join(tmp),
            None => PathBuf::from(tmp),
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Owner-only temp file, then rename over `target`.
async fn write_then_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    tokio::fs::write(tmp, bytes).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(tmp, perms).await?;
    }

    tokio::fs::rename(tmp, target).await
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        let txt = match tokio::fs::read_to_string(&self.path).await {
            Ok(txt) => txt,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        if txt.trim().is_empty() {
            return Ok(None);
        }

        let record: CredentialRecord = serde_json::from_str(&txt)?;
        Ok(record
            .token
            .filter(|t| !t.trim().is_empty())
            .map(Credential::new))
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        let record = CredentialRecord {
            token: Some(credential.as_str().to_string()),
            saved_at: Some(iso_timestamp_utc()),
        };
        let json = serde_json::to_string(&record)?;

        if let Some(dir) = parent_dir(&self.path) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let tmp_path = self.temp_path();
        if let Err(e) = write_then_rename(&tmp_path, &self.path, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(Error::Io(e));
        }

        debug!(path = %self.path.display(), "persisted credential");
        Ok(())
    }
}

// ============== In-memory store ==============

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(Credential::new(token))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot() = Some(credential.clone());
        Ok(())
    }
}

// ============== Provider ==============

/// Hands out a usable token: the cached one, or a freshly issued one.
pub struct CredentialProvider {
    store: Arc<dyn CredentialStore>,
    host: Arc<dyn ImageHost>,
}

impl CredentialProvider {
    pub fn new(store: Arc<dyn CredentialStore>, host: Arc<dyn ImageHost>) -> Self {
        Self { store, host }
    }

    /// Cached token if any, otherwise [`generate`](Self::generate).
    ///
    /// An unreadable cache is treated like an empty one.
    pub async fn get_valid(&self) -> Result<Credential> {
        match self.store.load().await {
            Ok(Some(credential)) => return Ok(credential),
            Ok(None) => debug!("no cached credential"),
            Err(e) => warn!(error = %e, "failed to read cached credential, regenerating"),
        }
        self.generate().await
    }

    /// Authenticate against the host and persist the new token.
    pub async fn generate(&self) -> Result<Credential> {
        info!("requesting new image-host token");
        let credential = self.host.authenticate().await?;
        self.store.save(&credential).await?;
        info!("image-host token refreshed");
        Ok(credential)
    }
}
