//! Error types for the storage module.

use thiserror::Error;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while planning or executing uploads.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0}")]
    UploadsForbidden(String),

    #[error("Blob: invalid source path {0:?}")]
    InvalidSource(String),

    #[error("Blob: uploads cancelled")]
    Cancelled,

    #[error("Invalid blob endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Blob: reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Blob: uploading to {target} failed: {message}")]
    Transfer { target: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
