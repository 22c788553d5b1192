//! Blob container addressing.

use url::Url;

use crate::error::{StorageError, StorageResult};

/// A blob container reachable under a storage account endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobContainer {
    endpoint: Url,
    name: String,
}

impl BlobContainer {
    /// Container under an explicit blob endpoint such as
    /// `https://account.blob.core.windows.net/`.
    pub fn new(endpoint: &str, name: impl Into<String>) -> StorageResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "https" | "http") || endpoint.cannot_be_a_base() {
            return Err(StorageError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self {
            endpoint,
            name: name.into(),
        })
    }

    /// Container under the public cloud endpoint of `account`.
    pub fn for_account(account: &str, name: impl Into<String>) -> StorageResult<Self> {
        Self::new(&format!("https://{}.blob.core.windows.net/", account), name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL of the blob stored under `key`. `/` in the key separates path
    /// segments; every segment is percent-encoded.
    pub fn blob_url(&self, key: &str) -> StorageResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidEndpoint(self.endpoint.to_string()))?;
            segments.pop_if_empty();
            segments.push(&self.name);
            for part in key.split('/').filter(|p| !p.is_empty() && *p != ".") {
                segments.push(part);
            }
        }
        Ok(url)
    }
}
