//! Byte-range backends and backend selection.

mod file;
mod http;
mod s3;

pub use file::{FileBackend, LocalFile};
pub use http::{default_progress, MemoryHttpBackend, ProgressCallback};
pub use s3::S3Backend;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::BackendConfig;
use crate::error::Result;

/// Uniform byte-range access to an OM file.
#[async_trait]
pub trait ReaderBackend: Send + Sync {
    /// Total size of the file in bytes.
    async fn count(&self) -> Result<u64>;

    /// Read exactly `size` bytes starting at `offset`.
    async fn get_bytes(&self, offset: u64, size: u64) -> Result<Bytes>;
}

/// What the viewer was asked to open.
#[derive(Debug)]
pub enum ViewerInput {
    /// A local file handle.
    File(LocalFile),
    /// An `s3://` or `http(s)://` reference.
    Url(String),
}

impl ViewerInput {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Name used in logs.
    pub fn describe(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Url(url) => url,
        }
    }
}

impl From<LocalFile> for ViewerInput {
    fn from(file: LocalFile) -> Self {
        Self::File(file)
    }
}

/// A backend resolved from a [`ViewerInput`].
pub enum Backend {
    File(FileBackend),
    Http(MemoryHttpBackend),
    S3(S3Backend),
}

impl Backend {
    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Http(_) => "http",
            Self::S3(_) => "s3",
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(b) => f.debug_tuple("File").field(&b.name()).finish(),
            Self::Http(b) => f.debug_tuple("Http").field(&b.url()).finish(),
            Self::S3(b) => f.debug_tuple("S3").field(&b.url()).finish(),
        }
    }
}

#[async_trait]
impl ReaderBackend for Backend {
    async fn count(&self) -> Result<u64> {
        match self {
            Self::File(b) => b.count().await,
            Self::Http(b) => b.count().await,
            Self::S3(b) => b.count().await,
        }
    }

    async fn get_bytes(&self, offset: u64, size: u64) -> Result<Bytes> {
        match self {
            Self::File(b) => b.get_bytes(offset, size).await,
            Self::Http(b) => b.get_bytes(offset, size).await,
            Self::S3(b) => b.get_bytes(offset, size).await,
        }
    }
}

/// Resolve the backend for an input.
///
/// - A local file becomes a [`FileBackend`].
/// - An `s3://` string becomes an [`S3Backend`] for the configured
///   region/bucket/key. The URL itself is not parsed.
/// - Anything else is treated as an HTTP(S) URL and becomes a
///   [`MemoryHttpBackend`] with the configured size ceiling.
pub async fn select_backend(
    input: ViewerInput,
    config: &BackendConfig,
    on_progress: ProgressCallback,
) -> Result<Backend> {
    match input {
        ViewerInput::File(file) => {
            info!(name = %file.name(), "Creating file backend for local file");
            Ok(Backend::File(FileBackend::new(file).await?))
        }
        ViewerInput::Url(url) if url.starts_with("s3://") => {
            info!(
                region = %config.s3.region,
                bucket = %config.s3.bucket,
                key = %config.s3.key,
                "Creating S3 backend"
            );
            if url != config.s3.url() {
                // TODO: parse bucket and key from the URL once non-default datasets are served
                warn!(
                    requested = %url,
                    configured = %config.s3.url(),
                    "S3 input does not select the object; using configured target"
                );
            }
            Ok(Backend::S3(S3Backend::new(config.s3.clone())?))
        }
        ViewerInput::Url(url) => {
            info!(url = %url, "Creating memory HTTP backend");
            Ok(Backend::Http(MemoryHttpBackend::new(
                url,
                config.http.clone(),
                Some(on_progress),
            )?))
        }
    }
}

/// Result of inspecting the first bytes of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderProbe {
    /// Total size in bytes.
    pub size: u64,
    /// The file starts with the `OM` magic.
    pub magic: bool,
    /// Format version byte following the magic.
    pub version: Option<u8>,
}

/// Check the `OM` magic and version byte at the start of a backend.
pub async fn probe_header<B: ReaderBackend + ?Sized>(backend: &B) -> Result<HeaderProbe> {
    let size = backend.count().await?;
    if size < 3 {
        return Ok(HeaderProbe {
            size,
            magic: false,
            version: None,
        });
    }

    let header = backend.get_bytes(0, 3).await?;
    let magic = &header[..2] == b"OM";
    Ok(HeaderProbe {
        size,
        magic,
        version: magic.then_some(header[2]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    fn no_progress() -> ProgressCallback {
        Arc::new(|_, _| {})
    }

    #[tokio::test]
    async fn test_local_file_selects_file_backend() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"OM\x03rest").unwrap();

        let file = LocalFile::open(tmp.path()).await.unwrap();
        let backend = select_backend(file.into(), &BackendConfig::default(), no_progress())
            .await
            .unwrap();

        assert_eq!(backend.kind(), "file");
        assert_eq!(backend.count().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_http_url_selects_http_backend() {
        let backend = select_backend(
            ViewerInput::url("https://example.com/data/temperature_2m.om"),
            &BackendConfig::default(),
            no_progress(),
        )
        .await
        .unwrap();

        match backend {
            Backend::Http(http) => {
                assert_eq!(http.url(), "https://example.com/data/temperature_2m.om");
                assert_eq!(http.max_file_size(), 500 * 1024 * 1024);
            }
            other => panic!("expected http backend, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_scheme_falls_back_to_http() {
        let backend = select_backend(
            ViewerInput::url("ftp://example.com/file.om"),
            &BackendConfig::default(),
            no_progress(),
        )
        .await
        .unwrap();
        assert_eq!(backend.kind(), "http");
    }

    #[tokio::test]
    async fn test_s3_url_uses_configured_target_not_url() {
        let backend = select_backend(
            ViewerInput::url("s3://my-bucket/path/to/file.om"),
            &BackendConfig::default(),
            no_progress(),
        )
        .await
        .unwrap();

        match backend {
            Backend::S3(s3) => {
                assert_eq!(s3.region(), "us-west-2");
                assert_eq!(s3.bucket(), "openmeteo");
                assert_eq!(
                    s3.key(),
                    "data_spatial/dwd_icon_d2/2025/04/26/0000Z/temperature_2m.om"
                );
                assert_ne!(s3.bucket(), "my-bucket");
                assert_ne!(s3.key(), "path/to/file.om");
                assert!(s3.cache_enabled());
            }
            other => panic!("expected s3 backend, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_header() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"OM\x03\x00\x00").unwrap();
        let backend = FileBackend::new(LocalFile::open(tmp.path()).await.unwrap())
            .await
            .unwrap();

        let probe = probe_header(&backend).await.unwrap();
        assert_eq!(
            probe,
            HeaderProbe {
                size: 5,
                magic: true,
                version: Some(3)
            }
        );
    }

    #[tokio::test]
    async fn test_probe_header_rejects_short_and_foreign_files() {
        let mut short = tempfile::NamedTempFile::new().unwrap();
        short.write_all(b"OM").unwrap();
        let backend = FileBackend::new(LocalFile::open(short.path()).await.unwrap())
            .await
            .unwrap();
        assert!(!probe_header(&backend).await.unwrap().magic);

        let mut foreign = tempfile::NamedTempFile::new().unwrap();
        foreign.write_all(b"GRIB").unwrap();
        let backend = FileBackend::new(LocalFile::open(foreign.path()).await.unwrap())
            .await
            .unwrap();
        let probe = probe_header(&backend).await.unwrap();
        assert!(!probe.magic);
        assert_eq!(probe.version, None);
    }
}
