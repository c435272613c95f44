//! Remote asset store client
//!
//! The upload pipeline hands image bytes to a remote asset store and gets a
//! stable reference URL back. The store's contract is one POST of the raw
//! bytes to its ingest endpoint, answered by `{url, id}` JSON or an error;
//! there is no partial-progress reporting and no retry.
//!
//! The `AssetStore` trait lets handlers run against the real HTTP client in
//! production and `MockAssetStore` in tests.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Terminal result of one upload attempt
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadResult {
    /// Stable reference URL for the stored asset
    pub url: String,
    /// Remote identifier of the stored asset
    pub id: String,
}

/// Error types for asset store operations
#[derive(Debug, thiserror::Error)]
pub enum AssetStoreError {
    /// The store answered, but rejected the upload
    #[error("asset store rejected upload: {0}")]
    Rejected(String),

    /// The store could not be reached or answered garbage
    #[error("asset store unavailable: {0}")]
    Unavailable(String),
}

/// Abstract asset store contract
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload one file's bytes; exactly one terminal outcome per attempt.
    async fn upload(&self, data: Vec<u8>) -> Result<UploadResult, AssetStoreError>;
}

/// Shared handle used in application state
pub type SharedAssetStore = Arc<dyn AssetStore>;

/// HTTP client for the real asset store
pub struct HttpAssetStore {
    client: reqwest::Client,
    ingest_url: String,
}

impl HttpAssetStore {
    /// Create a client for the given ingest endpoint
    pub fn new(ingest_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            ingest_url: ingest_url.into(),
        }
    }

    /// Create a shared store for dependency injection
    pub fn shared(ingest_url: impl Into<String>) -> SharedAssetStore {
        Arc::new(Self::new(ingest_url))
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(&self, data: Vec<u8>) -> Result<UploadResult, AssetStoreError> {
        let response = self
            .client
            .post(&self.ingest_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|e| AssetStoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssetStoreError::Rejected(format!("{}: {}", status, body)));
        }

        response
            .json::<UploadResult>()
            .await
            .map_err(|e| AssetStoreError::Unavailable(format!("bad ingest response: {}", e)))
    }
}

/// In-memory mock for tests.
///
/// Counts uploads and returns a deterministic URL per upload, or a simulated
/// failure when constructed with `new_failing`.
pub struct MockAssetStore {
    should_fail: bool,
    uploads: AtomicUsize,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            uploads: AtomicUsize::new(0),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            uploads: AtomicUsize::new(0),
        }
    }

    /// Number of upload attempts seen so far
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

impl Default for MockAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn upload(&self, _data: Vec<u8>) -> Result<UploadResult, AssetStoreError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;

        if self.should_fail {
            return Err(AssetStoreError::Rejected(
                "mock asset store: simulated failure".to_string(),
            ));
        }

        Ok(UploadResult {
            url: format!("http://assets.local/mock/{}.png", n),
            id: format!("mock-{}", n),
        })
    }
}
