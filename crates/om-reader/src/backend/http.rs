//! HTTP(S) backend that buffers the whole file in memory.
//!
//! The first access downloads the resource once; every later range is
//! served from the buffer.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::ReaderBackend;
use crate::config::HttpOptions;
use crate::error::{OmReaderError, Result};

/// Called with (bytes loaded, total bytes) while downloading.
///
/// `total` falls back to the bytes loaded so far when the server sends no
/// content length.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Progress callback that logs the download percentage.
pub fn default_progress() -> ProgressCallback {
    Arc::new(|loaded, total| {
        debug!(
            loaded,
            total,
            percent = percent(loaded, total),
            "Downloaded: {} / {} bytes",
            loaded,
            total
        );
    })
}

fn percent(loaded: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    ((loaded as f64 / total as f64) * 100.0).round() as u64
}

/// In-memory HTTP backend with a size ceiling.
pub struct MemoryHttpBackend {
    url: String,
    client: Client,
    options: HttpOptions,
    on_progress: Option<ProgressCallback>,
    data: OnceCell<Bytes>,
}

impl MemoryHttpBackend {
    /// Create a backend. No request is made until the first access.
    pub fn new(
        url: impl Into<String>,
        options: HttpOptions,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.request_timeout())
            .connect_timeout(options.connect_timeout())
            .build()
            .map_err(|e| OmReaderError::open_failed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            options,
            on_progress,
            data: OnceCell::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn max_file_size(&self) -> u64 {
        self.options.max_file_size
    }

    /// Whether the file has been downloaded already.
    pub fn is_loaded(&self) -> bool {
        self.data.initialized()
    }

    async fn data(&self) -> Result<&Bytes> {
        self.data.get_or_try_init(|| self.download()).await
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn download(&self) -> Result<Bytes> {
        let max = self.options.max_file_size;
        let response = self.client.get(&self.url).send().await?.error_for_status()?;

        let total = response.content_length();
        if let Some(size) = total {
            if size > max {
                return Err(OmReaderError::FileTooLarge { size, max });
            }
        }

        let mut buffer = BytesMut::with_capacity(total.unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);

            let loaded = buffer.len() as u64;
            if loaded > max {
                return Err(OmReaderError::FileTooLarge { size: loaded, max });
            }

            if self.options.debug {
                debug!(chunk = chunk.len(), loaded, "Received chunk");
            }
            if let Some(on_progress) = &self.on_progress {
                on_progress(loaded, total.unwrap_or(loaded));
            }
        }

        info!(size = buffer.len(), "Downloaded file into memory");
        Ok(buffer.freeze())
    }
}

#[async_trait]
impl ReaderBackend for MemoryHttpBackend {
    async fn count(&self) -> Result<u64> {
        Ok(self.data().await?.len() as u64)
    }

    async fn get_bytes(&self, offset: u64, size: u64) -> Result<Bytes> {
        let data = self.data().await?;
        let len = data.len() as u64;
        let end = offset.saturating_add(size);
        if end > len {
            return Err(OmReaderError::OutOfBounds { offset, end, len });
        }
        Ok(data.slice(offset as usize..end as usize))
    }
}
