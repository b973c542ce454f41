//! Local file backend.

use std::io::SeekFrom;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;
use tracing::instrument;

use super::ReaderBackend;
use crate::error::{OmReaderError, Result};

/// A local file handle together with the name it was picked under.
#[derive(Debug)]
pub struct LocalFile {
    name: String,
    file: File,
}

impl LocalFile {
    /// Wrap an already open file.
    pub fn new(name: impl Into<String>, file: File) -> Self {
        Self {
            name: name.into(),
            file,
        }
    }

    /// Open a file from disk.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            OmReaderError::open_failed(format!("{}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, file))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Backend reading ranges directly from a local file.
pub struct FileBackend {
    name: String,
    file: Mutex<File>,
    len: u64,
}

impl FileBackend {
    pub async fn new(local: LocalFile) -> Result<Self> {
        let len = local.file.metadata().await?.len();
        Ok(Self {
            name: local.name,
            file: Mutex::new(local.file),
            len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ReaderBackend for FileBackend {
    async fn count(&self) -> Result<u64> {
        Ok(self.len)
    }

    #[instrument(skip(self), fields(name = %self.name))]
    async fn get_bytes(&self, offset: u64, size: u64) -> Result<Bytes> {
        let end = offset.saturating_add(size);
        if end > self.len {
            return Err(OmReaderError::OutOfBounds {
                offset,
                end,
                len: self.len,
            });
        }

        let mut buffer = vec![0u8; size as usize];
        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(offset)).await?;
        file.read_exact(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}
