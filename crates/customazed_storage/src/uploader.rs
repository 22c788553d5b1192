//! Deferred upload planning.
//!
//! Template evaluation registers local files with an [`ArtifactUploader`]
//! and immediately receives the URL they will live at. Nothing is
//! transferred until the owner calls [`ArtifactUploader::execute`], which
//! happens after the whole document has been rendered successfully.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use customazed_template::{ArtifactRegistry, TemplateError, TemplateResult};
use tracing::{debug, info};
use url::Url;

use crate::container::BlobContainer;
use crate::error::{StorageError, StorageResult};
use crate::transport::BlobTransport;

/// Planning and execution of artifact uploads.
#[async_trait]
pub trait ArtifactUploader: Send {
    /// Whether uploads can happen at all.
    fn is_enabled(&self) -> bool;

    /// Number of distinct artifacts registered so far.
    fn file_count(&self) -> usize;

    /// Number of registered artifacts not transferred yet.
    fn pending_count(&self) -> usize;

    /// Register `source` for upload and return its destination URL.
    /// Registering the same source again returns the same URL.
    fn add(&mut self, source: &str) -> StorageResult<String>;

    /// Transfer every pending artifact, returning how many were sent.
    async fn execute(&mut self) -> StorageResult<usize>;

    /// View this uploader as the registry behind the `upload` function.
    fn as_registry(&mut self) -> &mut dyn ArtifactRegistry;
}

/// Lifecycle of a [`BlobUploader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// Nothing registered.
    Idle,
    /// Registrations pending transfer.
    Planning,
    /// Transfers in progress.
    Executing,
    /// Every registration has been transferred.
    Done,
}

/// Transfer status of a planned upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Transferred,
}

/// A registered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    /// Local path as written in the template.
    pub source: String,
    /// Blob name inside the container.
    pub key: String,
    pub url: Url,
    pub status: UploadStatus,
}

/// Uploads artifacts into a blob container under a per-configuration prefix.
pub struct BlobUploader {
    container: BlobContainer,
    prefix: String,
    entries: Vec<PlannedUpload>,
    index: HashMap<String, usize>,
    transport: Arc<dyn BlobTransport>,
    online: bool,
    state: PlannerState,
}

impl BlobUploader {
    /// Create an uploader placing blobs at `<container>/<prefix>/<source>`.
    pub fn new(
        container: BlobContainer,
        prefix: impl Into<String>,
        transport: Arc<dyn BlobTransport>,
    ) -> Self {
        Self {
            container,
            prefix: prefix.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            transport,
            online: true,
            state: PlannerState::Idle,
        }
    }

    /// When offline, URLs are still computed but `execute` sends nothing.
    pub fn with_online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// Registered artifacts in registration order.
    pub fn entries(&self) -> &[PlannedUpload] {
        &self.entries
    }

    /// URL of the directory all artifacts are placed under.
    pub fn destination(&self) -> StorageResult<Url> {
        self.container.blob_url(&self.prefix)
    }
}

#[async_trait]
impl ArtifactUploader for BlobUploader {
    fn is_enabled(&self) -> bool {
        true
    }

    fn file_count(&self) -> usize {
        self.entries.len()
    }

    fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == UploadStatus::Pending)
            .count()
    }

    fn add(&mut self, source: &str) -> StorageResult<String> {
        let relative = source_key(source)?;
        if let Some(&i) = self.index.get(&relative) {
            return Ok(self.entries[i].url.to_string());
        }

        let key = format!("{}/{}", self.prefix, relative);
        let url = self.container.blob_url(&key)?;
        info!("Blob: adding {}", source);

        self.index.insert(relative, self.entries.len());
        self.entries.push(PlannedUpload {
            source: source.to_string(),
            key,
            url: url.clone(),
            status: UploadStatus::Pending,
        });
        if matches!(self.state, PlannerState::Idle | PlannerState::Done) {
            self.state = PlannerState::Planning;
        }
        Ok(url.to_string())
    }

    async fn execute(&mut self) -> StorageResult<usize> {
        let pending = self.pending_count();
        if pending == 0 {
            debug!("Blob: nothing to upload");
            return Ok(0);
        }
        if !self.online {
            info!("Blob: offline, skipping {} uploads", pending);
            return Ok(0);
        }

        info!("Blob: destination {}", self.destination()?);
        self.state = PlannerState::Executing;

        let mut transferred = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.status == UploadStatus::Pending)
        {
            info!("Blob: uploading {}", entry.source);
            if let Err(e) = transfer(self.transport.as_ref(), entry).await {
                self.state = PlannerState::Planning;
                return Err(e);
            }
            entry.status = UploadStatus::Transferred;
            transferred += 1;
        }

        self.state = PlannerState::Done;
        Ok(transferred)
    }

    fn as_registry(&mut self) -> &mut dyn ArtifactRegistry {
        self
    }
}

/// Blob name of `source` below the prefix. Empty and `.` segments are
/// dropped so spellings of the same path share one blob; `..` is rejected
/// because it would let two different files land on the same key.
fn source_key(source: &str) -> StorageResult<String> {
    let mut parts = Vec::new();
    for part in source.trim().split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(StorageError::InvalidSource(source.to_string())),
            _ => parts.push(part),
        }
    }
    if parts.is_empty() {
        return Err(StorageError::InvalidSource(source.to_string()));
    }
    Ok(parts.join("/"))
}

async fn transfer(transport: &dyn BlobTransport, entry: &PlannedUpload) -> StorageResult<()> {
    let body = tokio::fs::read(&entry.source)
        .await
        .map_err(|source| StorageError::Read {
            path: entry.source.clone(),
            source,
        })?;
    debug!("Blob: {} -> {} ({} bytes)", entry.source, entry.key, body.len());
    transport.put_block_blob(&entry.url, body).await
}

impl ArtifactRegistry for BlobUploader {
    fn register(&mut self, source: &str) -> TemplateResult<String> {
        self.add(source).map_err(registration_error)
    }
}

/// Uploader used where uploads are not allowed, such as while the
/// configuration itself is being resolved or when no storage is configured.
#[derive(Debug, Clone)]
pub struct DisabledUploader {
    reason: String,
}

impl DisabledUploader {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl ArtifactUploader for DisabledUploader {
    fn is_enabled(&self) -> bool {
        false
    }

    fn file_count(&self) -> usize {
        0
    }

    fn pending_count(&self) -> usize {
        0
    }

    fn add(&mut self, _source: &str) -> StorageResult<String> {
        Err(StorageError::UploadsForbidden(self.reason.clone()))
    }

    async fn execute(&mut self) -> StorageResult<usize> {
        Err(StorageError::UploadsForbidden(self.reason.clone()))
    }

    fn as_registry(&mut self) -> &mut dyn ArtifactRegistry {
        self
    }
}

impl ArtifactRegistry for DisabledUploader {
    fn register(&mut self, source: &str) -> TemplateResult<String> {
        self.add(source).map_err(registration_error)
    }
}

fn registration_error(err: StorageError) -> TemplateError {
    match err {
        StorageError::UploadsForbidden(reason) => TemplateError::UploadDisabled(reason),
        other => TemplateError::Upload(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    fn uploader(transport: &MockTransport) -> BlobUploader {
        let container = BlobContainer::for_account("mystore", "scripts").unwrap();
        BlobUploader::new(container, "abc123", Arc::new(transport.clone()))
    }

    #[test]
    fn test_add_returns_stable_url() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        assert_eq!(up.state(), PlannerState::Idle);

        let first = up.add("setup/a.sh").unwrap();
        let again = up.add("setup/a.sh").unwrap();
        assert_eq!(first, again);
        assert_eq!(
            first,
            "https://mystore.blob.core.windows.net/scripts/abc123/setup/a.sh"
        );
        assert_eq!(up.file_count(), 1);
        assert_eq!(up.pending_count(), 1);
        assert_eq!(up.state(), PlannerState::Planning);
        assert_eq!(transport.put_count(), 0);
    }

    #[test]
    fn test_add_keeps_registration_order() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        up.add("b.ps1").unwrap();
        up.add("a.sh").unwrap();
        up.add("b.ps1").unwrap();
        let sources: Vec<&str> = up.entries().iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["b.ps1", "a.sh"]);
    }

    #[test]
    fn test_empty_source_rejected() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        let err = up.add("  ").unwrap_err();
        assert!(matches!(err, StorageError::InvalidSource(_)));
        let err = up.as_registry().register("./").unwrap_err();
        assert_eq!(
            err,
            TemplateError::Upload("Blob: invalid source path \"./\"".to_string())
        );
        assert_eq!(up.file_count(), 0);
    }

    #[test]
    fn test_parent_segments_rejected() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        up.add("other/a.sh").unwrap();
        let err = up.add("../../other/a.sh").unwrap_err();
        assert!(matches!(err, StorageError::InvalidSource(ref s) if s == "../../other/a.sh"));
        assert!(up.add("setup/../a.sh").is_err());
        assert_eq!(up.file_count(), 1);
    }

    #[test]
    fn test_equivalent_spellings_share_one_entry() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        let plain = up.add("a.sh").unwrap();
        let dotted = up.add("./a.sh").unwrap();
        let doubled = up.add("setup//b.sh").unwrap();
        assert_eq!(plain, dotted);
        assert_eq!(doubled, up.add("setup/b.sh").unwrap());
        assert_eq!(up.file_count(), 2);
        assert_eq!(up.pending_count(), 2);
        assert_eq!(up.entries()[0].source, "a.sh");
        assert_eq!(up.entries()[0].key, "abc123/a.sh");
    }

    #[test]
    fn test_disabled_registration_error() {
        let mut up = DisabledUploader::new("upload: forbidden in customazed.json");
        let err = up.as_registry().register("a.sh").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UploadDisabled("upload: forbidden in customazed.json".to_string())
        );
        assert_eq!(err.to_string(), "upload: forbidden in customazed.json");
        assert!(!up.is_enabled());
    }

    #[tokio::test]
    async fn test_execute_with_nothing_pending() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        assert_eq!(up.execute().await.unwrap(), 0);
        assert_eq!(transport.put_count(), 0);
    }

    #[tokio::test]
    async fn test_offline_execute_sends_nothing() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport).with_online(false);
        up.add("missing/file.sh").unwrap();
        assert_eq!(up.execute().await.unwrap(), 0);
        assert_eq!(up.pending_count(), 1);
        assert_eq!(transport.put_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_fails_transfer() {
        let transport = MockTransport::new();
        let mut up = uploader(&transport);
        up.add("/nonexistent/customazed/a.sh").unwrap();
        let err = up.execute().await.unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
        assert_eq!(up.pending_count(), 1);
        assert_eq!(up.state(), PlannerState::Planning);
    }

    #[tokio::test]
    async fn test_disabled_execute_fails() {
        let mut up = DisabledUploader::new("upload: no storage configuration");
        let err = up.execute().await.unwrap_err();
        assert!(matches!(err, StorageError::UploadsForbidden(_)));
    }
}
