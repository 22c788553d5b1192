//! Blob transfer trait.

use async_trait::async_trait;
use url::Url;

use crate::error::StorageResult;

/// Moves bytes into blob storage.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    /// Create or replace the block blob at `url` with `body`.
    async fn put_block_blob(&self, url: &Url, body: Vec<u8>) -> StorageResult<()>;
}
