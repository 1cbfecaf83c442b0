//! Port for the remote image-hosting API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{credential::Credential, Result};

/// An image ready to be uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl ImageFile {
    pub const DEFAULT_FILE_NAME: &'static str = "image.jpg";
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    /// A JPEG named `image.jpg` (what Telegram delivers for compressed photos).
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: Self::DEFAULT_FILE_NAME.to_string(),
            mime_type: Self::DEFAULT_MIME_TYPE.to_string(),
        }
    }

    pub fn with_name(mut self, file_name: Option<String>, mime_type: Option<String>) -> Self {
        if let Some(name) = file_name.filter(|n| !n.trim().is_empty()) {
            self.file_name = name;
        }
        if let Some(mime) = mime_type.filter(|m| !m.trim().is_empty()) {
            self.mime_type = mime;
        }
        self
    }
}

/// Links returned by the host for an uploaded image. Either field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
}

/// Outcome of a single upload request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadAttempt {
    Uploaded(UploadResult),
    /// The server rejected the bearer token (HTTP 401).
    Unauthorized,
}

/// Hexagonal port for the image host.
///
/// `authenticate` uses the service-account login the implementation was built
/// with. `upload` reports a rejected token as `Ok(Unauthorized)` so the caller
/// owns the retry policy; every other failure is an `Err`.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn authenticate(&self) -> Result<Credential>;

    async fn upload(&self, image: &ImageFile, token: &Credential) -> Result<UploadAttempt>;
}
