//! Mock blob transport for testing.
//!
//! Records every transfer instead of touching the network, and can be told
//! to fail transfers whose URL contains a given fragment.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use url::Url;

use crate::error::{StorageError, StorageResult};
use crate::transport::BlobTransport;

/// A transfer captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPut {
    pub url: String,
    pub body: Vec<u8>,
}

/// Mock blob transport. Clones share the same recorded state.
#[derive(Clone, Default)]
pub struct MockTransport {
    puts: Arc<RwLock<Vec<CapturedPut>>>,
    fail_matching: Arc<RwLock<Option<String>>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail transfers whose URL contains `fragment`.
    pub fn fail_matching(self, fragment: impl Into<String>) -> Self {
        *self.fail_matching.write() = Some(fragment.into());
        self
    }

    /// Stop simulating failures.
    pub fn clear_failure(&self) {
        *self.fail_matching.write() = None;
    }

    /// All captured transfers, in order.
    pub fn puts(&self) -> Vec<CapturedPut> {
        self.puts.read().clone()
    }

    /// Number of transfers performed.
    pub fn put_count(&self) -> usize {
        self.puts.read().len()
    }
}

#[async_trait]
impl BlobTransport for MockTransport {
    async fn put_block_blob(&self, url: &Url, body: Vec<u8>) -> StorageResult<()> {
        let failing = self.fail_matching.read().clone();
        if let Some(fragment) = failing {
            if url.as_str().contains(&fragment) {
                return Err(StorageError::Transfer {
                    target: url.to_string(),
                    message: "simulated failure".to_string(),
                });
            }
        }
        self.puts.write().push(CapturedPut {
            url: url.to_string(),
            body,
        });
        Ok(())
    }
}
