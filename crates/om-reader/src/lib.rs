//! Reader sessions and byte-range backends for OM files.
//!
//! This crate sits between the viewer and the external OM decoder. It provides:
//!
//! - **Backends**: uniform byte-range access over a local file, an HTTP(S)
//!   resource buffered in memory, or an S3 object
//! - **Backend selection**: picks the backend from the shape of the input
//! - **Reader seam**: the [`OmReader`] / [`ReaderOpener`] traits the decoder
//!   implements, plus the format's compression and data type codes
//!
//! # Architecture
//!
//! ```text
//! ViewerInput (File | Url)
//!      │
//!      ▼
//! select_backend()
//!      │
//!      ├─► File        → FileBackend
//!      ├─► s3://…      → S3Backend (fixed target, LRU range cache)
//!      └─► http(s)://… → MemoryHttpBackend (500 MiB ceiling, progress)
//!               │
//!               ▼
//! ReaderOpener::open(backend) → Arc<dyn OmReader>
//!               │
//!               ▼
//! reader.read(FloatArray, ranges) → flat Vec<f32>
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod reader;
pub mod types;

// Re-export commonly used types at crate root
pub use backend::{
    default_progress, probe_header, select_backend, Backend, FileBackend, HeaderProbe,
    LocalFile, MemoryHttpBackend, ProgressCallback, ReaderBackend, S3Backend, ViewerInput,
};
pub use cache::{RangeCache, RangeCacheStats};
pub use config::{BackendConfig, HttpOptions, S3Options};
pub use error::{OmReaderError, Result};
pub use reader::{OmReader, ReaderOpener};
pub use types::{CompressionType, DimRange, OmDataType};
