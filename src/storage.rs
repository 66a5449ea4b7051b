//! Video object storage.
//!
//! Two backends: a local directory served by the API itself, and a remote
//! REST object store (Supabase-style `storage/v1` endpoints) reached with
//! reqwest.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write video: {0}")]
    Io(#[from] std::io::Error),
    #[error("object store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("object store rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Store `data` under `filename` and return its public URL.
    async fn put(&self, filename: &str, content_type: &str, data: Bytes) -> Result<String, StorageError>;
}

/// Unique object name that keeps the upload's extension, e.g. `3f0c...e1.mov`.
pub fn video_filename(original: Option<&str>) -> String {
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "mp4".to_string());

    format!("{}.{}", Uuid::new_v4(), extension)
}

pub struct LocalVideoStore {
    root: PathBuf,
    public_url: String,
}

impl LocalVideoStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl VideoStore for LocalVideoStore {
    async fn put(&self, filename: &str, _content_type: &str, data: Bytes) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(filename), &data).await?;

        Ok(format!("{}/{}", self.public_url.trim_end_matches('/'), filename))
    }
}

pub struct HttpVideoStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl HttpVideoStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, filename: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, filename)
    }

    fn public_url(&self, filename: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, filename)
    }
}

#[async_trait]
impl VideoStore for HttpVideoStore {
    async fn put(&self, filename: &str, content_type: &str, data: Bytes) -> Result<String, StorageError> {
        let response = self
            .client
            .post(self.object_url(filename))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(filename))
    }
}
