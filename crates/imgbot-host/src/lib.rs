//! Image-host HTTP adapter.
//!
//! Implements the `imgbot-core` [`ImageHost`] port against the hosting API:
//! `POST {base}/tokens` for a bearer token and a multipart `POST {base}/upload`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use imgbot_core::{
    credential::Credential,
    errors::Error,
    host::{ImageFile, ImageHost, UploadAttempt, UploadResult},
    utils::truncate_text,
    Result,
};

const MAX_BODY_IN_ERROR: usize = 200;

#[derive(Clone, Debug)]
pub struct HostConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub strategy_id: u32,
    pub timeout: Duration,
}

impl From<&imgbot_core::config::Config> for HostConfig {
    fn from(cfg: &imgbot_core::config::Config) -> Self {
        Self {
            base_url: cfg.api_base_url.clone(),
            email: cfg.api_email.clone(),
            password: cfg.api_password.clone(),
            strategy_id: cfg.strategy_id,
            timeout: cfg.request_timeout,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HostClient {
    cfg: HostConfig,
    http: reqwest::Client,
}

impl HostClient {
    pub fn new(cfg: HostConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;
        Ok(Self { cfg, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ImageHost for HostClient {
    async fn authenticate(&self) -> Result<Credential> {
        let resp = self
            .http
            .post(self.endpoint("tokens"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "email": self.cfg.email,
                "password": self.cfg.password,
            }))
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token request error: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token request failed: {status} {}",
                truncate_text(&body, MAX_BODY_IN_ERROR)
            )));
        }

        let v: Value = resp
            .json()
            .await
            .map_err(|e| Error::Auth(format!("token response is not json: {e}")))?;

        let token = extract_token(&v)
            .ok_or_else(|| Error::Auth("token response has no data.token".to_string()))?;
        debug!("issued image-host token");
        Ok(Credential::new(token))
    }

    async fn upload(&self, image: &ImageFile, token: &Credential) -> Result<UploadAttempt> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| Error::Upload(format!("multipart error: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("strategy_id", self.cfg.strategy_id.to_string());

        let resp = self
            .http
            .post(self.endpoint("upload"))
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("upload request error: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(UploadAttempt::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "{status} {}",
                truncate_text(&body, MAX_BODY_IN_ERROR)
            )));
        }

        let v: Value = resp
            .json()
            .await
            .map_err(|e| Error::Upload(format!("upload response is not json: {e}")))?;

        Ok(UploadAttempt::Uploaded(extract_links(&v)))
    }
}

fn extract_token(v: &Value) -> Option<String> {
    v.get("data")
        .and_then(|d| d.get("token"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}

/// `data.links` when present (the hosting software's own shape), else `data`.
fn extract_links(v: &Value) -> UploadResult {
    let Some(data) = v.get("data") else {
        return UploadResult::default();
    };
    let links = data.get("links").filter(|l| l.is_object()).unwrap_or(data);
    let field = |name: &str| {
        links
            .get(name)
            .and_then(|s| s.as_str())
            .map(str::to_string)
    };

    UploadResult {
        url: field("url"),
        markdown: field("markdown"),
    }
}
