//! HTTP implementation of BlobTransport.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{StorageError, StorageResult};
use crate::transport::BlobTransport;

/// Storage REST API version sent with every request. Bearer authentication
/// needs 2017-11-09 or later.
pub const STORAGE_API_VERSION: &str = "2021-08-06";

/// Blob REST transport over reqwest.
pub struct HttpBlobTransport {
    client: Client,
    bearer_token: Option<String>,
}

impl HttpBlobTransport {
    /// Create a new transport.
    pub fn new() -> StorageResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("customazed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            bearer_token: None,
        })
    }

    /// Authenticate transfers with an OAuth access token for the storage
    /// resource. Without one, URLs must carry their own SAS query.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.is_empty());
        self
    }
}

#[async_trait]
impl BlobTransport for HttpBlobTransport {
    async fn put_block_blob(&self, url: &Url, body: Vec<u8>) -> StorageResult<()> {
        debug!("PUT {} ({} bytes)", url, body.len());

        let mut request = self
            .client
            .put(url.clone())
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", STORAGE_API_VERSION)
            .body(body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            let detail = response.text().await.unwrap_or_default();
            return Err(StorageError::Transfer {
                target: url.to_string(),
                message: format!("{} {}", status, detail.trim()).trim_end().to_string(),
            });
        }
        Ok(())
    }
}
