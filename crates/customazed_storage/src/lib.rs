//! # customazed_storage
//!
//! Deferred artifact uploads for customazed.
//!
//! The `upload` template function registers local files with an
//! [`ArtifactUploader`] and substitutes the blob URL they will be reachable
//! at. Transfers happen later, in one batch, once rendering has succeeded:
//!
//! - [`BlobUploader`]: plans blobs under `<container>/<prefix>/` and sends
//!   them through a [`BlobTransport`]
//! - [`DisabledUploader`]: refuses every registration with a fixed reason
//! - [`HttpBlobTransport`]: Blob REST `Put Blob` over HTTPS
//! - [`MockTransport`]: in-memory transport for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use customazed_storage::{ArtifactUploader, BlobContainer, BlobUploader, HttpBlobTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let container = BlobContainer::for_account("mystore", "scripts")?;
//! let transport = Arc::new(HttpBlobTransport::new()?);
//! let mut uploader = BlobUploader::new(container, "0b8e4a3c", transport);
//!
//! let url = uploader.add("setup/install.sh")?;
//! println!("will upload to {}", url);
//! uploader.execute().await?;
//! # Ok(())
//! # }
//! ```

pub mod container;
pub mod error;
pub mod http;
pub mod mock;
pub mod transport;
pub mod uploader;

pub use container::BlobContainer;
pub use error::{StorageError, StorageResult};
pub use http::{HttpBlobTransport, STORAGE_API_VERSION};
pub use mock::{CapturedPut, MockTransport};
pub use transport::BlobTransport;
pub use uploader::{
    ArtifactUploader, BlobUploader, DisabledUploader, PlannedUpload, PlannerState, UploadStatus,
};
