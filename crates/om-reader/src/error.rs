//! Error types for reader sessions and backends.

use thiserror::Error;

/// Errors that can occur while opening or reading an OM file.
#[derive(Error, Debug)]
pub enum OmReaderError {
    /// Failed to open the reader session or its backend.
    #[error("failed to open reader: {0}")]
    OpenFailed(String),

    /// Failed to read data from the reader session.
    #[error("failed to read data: {0}")]
    ReadFailed(String),

    /// The requested byte range is outside the backend.
    #[error("byte range {offset}..{end} is outside backend of {len} bytes")]
    OutOfBounds { offset: u64, end: u64, len: u64 },

    /// The remote file is larger than the configured ceiling.
    #[error("file size {size} exceeds maximum of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Invalid or unreadable metadata.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl OmReaderError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a StorageError.
    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }
}

impl From<std::io::Error> for OmReaderError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<reqwest::Error> for OmReaderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<object_store::Error> for OmReaderError {
    fn from(err: object_store::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, OmReaderError>;
