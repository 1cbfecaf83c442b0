use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    credential::{Credential, CredentialProvider},
    errors::Error,
    host::{ImageFile, ImageHost, UploadAttempt, UploadResult},
    Result,
};

/// Token regenerations allowed per logical upload.
const MAX_REGENERATIONS: usize = 1;

/// Uploads images, refreshing the bearer token once if the host rejects it.
pub struct Uploader {
    host: Arc<dyn ImageHost>,
    credentials: Arc<CredentialProvider>,
}

impl Uploader {
    pub fn new(host: Arc<dyn ImageHost>, credentials: Arc<CredentialProvider>) -> Self {
        Self { host, credentials }
    }

    /// Fetch a token from the provider, then [`upload`](Self::upload).
    pub async fn upload_image(&self, image: &ImageFile) -> Result<UploadResult> {
        let token = self.credentials.get_valid().await?;
        self.upload(image, token).await
    }

    /// Upload with `token`. A 401 triggers one regeneration and one retry; a
    /// second 401 is final.
    pub async fn upload(&self, image: &ImageFile, token: Credential) -> Result<UploadResult> {
        let mut token = token;
        let mut regenerations = 0usize;
        loop {
            match self.host.upload(image, &token).await? {
                UploadAttempt::Uploaded(result) => {
                    info!(
                        url = result.url.as_deref().unwrap_or("<none>"),
                        bytes = image.bytes.len(),
                        "image uploaded"
                    );
                    return Ok(result);
                }
                UploadAttempt::Unauthorized if regenerations < MAX_REGENERATIONS => {
                    regenerations += 1;
                    warn!("image host rejected token, regenerating and retrying");
                    token = self.credentials.generate().await?;
                }
                UploadAttempt::Unauthorized => {
                    return Err(Error::Upload(
                        "image host rejected a freshly generated token (401)".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{CredentialStore, MemoryCredentialStore};
    use crate::testing::{FakeHost, Scripted};

    fn setup(
        host: FakeHost,
        cached: Option<&str>,
    ) -> (Arc<FakeHost>, Arc<MemoryCredentialStore>, Uploader) {
        let host = Arc::new(host);
        let store = Arc::new(match cached {
            Some(t) => MemoryCredentialStore::with_token(t),
            None => MemoryCredentialStore::new(),
        });
        let provider = Arc::new(CredentialProvider::new(store.clone(), host.clone()));
        let uploader = Uploader::new(host.clone(), provider);
        (host, store, uploader)
    }

    fn links(url: &str) -> UploadResult {
        UploadResult {
            url: Some(url.to_string()),
            markdown: Some(format!("![]({url})")),
        }
    }

    #[tokio::test]
    async fn uploads_with_cached_token() {
        let (host, _store, uploader) = setup(
            FakeHost::new().with_uploads(vec![Scripted::Uploaded(links("https://h/a.jpg"))]),
            Some("cached"),
        );

        let out = uploader.upload_image(&ImageFile::jpeg(vec![1, 2])).await.unwrap();
        assert_eq!(out, links("https://h/a.jpg"));
        assert_eq!(host.auth_calls(), 0);
        assert_eq!(host.upload_tokens(), vec!["cached".to_string()]);
    }

    #[tokio::test]
    async fn retries_once_after_unauthorized() {
        let (host, store, uploader) = setup(
            FakeHost::new().with_uploads(vec![
                Scripted::Unauthorized,
                Scripted::Uploaded(links("https://h/b.jpg")),
            ]),
            Some("stale"),
        );

        let out = uploader.upload_image(&ImageFile::jpeg(vec![1, 2])).await.unwrap();
        assert_eq!(out, links("https://h/b.jpg"));
        assert_eq!(host.auth_calls(), 1);
        assert_eq!(
            host.upload_tokens(),
            vec!["stale".to_string(), "tok-1".to_string()]
        );
        assert_eq!(store.load().await.unwrap(), Some(Credential::new("tok-1")));
    }

    #[tokio::test]
    async fn second_unauthorized_is_final() {
        let (host, _store, uploader) = setup(
            FakeHost::new().with_uploads(vec![
                Scripted::Unauthorized,
                Scripted::Unauthorized,
                Scripted::Uploaded(links("https://h/never.jpg")),
            ]),
            Some("stale"),
        );

        let err = uploader
            .upload_image(&ImageFile::jpeg(vec![1, 2]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload(_)), "{err:?}");
        assert_eq!(host.auth_calls(), 1);
        assert_eq!(host.upload_tokens().len(), 2);
    }

    #[tokio::test]
    async fn fresh_token_rejected_after_initial_generation_still_retries_once() {
        let (host, _store, uploader) = setup(
            FakeHost::new().with_uploads(vec![
                Scripted::Unauthorized,
                Scripted::Uploaded(links("https://h/c.jpg")),
            ]),
            None,
        );

        uploader.upload_image(&ImageFile::jpeg(vec![9])).await.unwrap();
        // One generation for the empty store, one after the 401.
        assert_eq!(host.auth_calls(), 2);
        assert_eq!(
            host.upload_tokens(),
            vec!["tok-1".to_string(), "tok-2".to_string()]
        );
    }

    #[tokio::test]
    async fn other_failures_are_not_retried() {
        let (host, _store, uploader) = setup(
            FakeHost::new().with_uploads(vec![Scripted::Fail("500 boom".to_string())]),
            Some("cached"),
        );

        let err = uploader
            .upload_image(&ImageFile::jpeg(vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload(ref m) if m.contains("boom")), "{err:?}");
        assert_eq!(host.auth_calls(), 0);
        assert_eq!(host.upload_tokens().len(), 1);
    }

    #[tokio::test]
    async fn auth_failure_during_retry_surfaces() {
        let (host, _store, uploader) = setup(
            FakeHost::new()
                .failing_auth()
                .with_uploads(vec![Scripted::Unauthorized]),
            Some("stale"),
        );

        let err = uploader
            .upload_image(&ImageFile::jpeg(vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)), "{err:?}");
        assert_eq!(host.upload_tokens().len(), 1);
    }

    #[tokio::test]
    async fn explicit_token_is_used_as_given() {
        let (host, _store, uploader) = setup(
            FakeHost::new().with_uploads(vec![Scripted::Uploaded(UploadResult::default())]),
            Some("cached"),
        );

        let out = uploader
            .upload(&ImageFile::jpeg(vec![1]), Credential::new("explicit"))
            .await
            .unwrap();
        assert_eq!(out, UploadResult::default());
        assert_eq!(host.upload_tokens(), vec!["explicit".to_string()]);
    }
}
