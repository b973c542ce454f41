//! S3 backend using ranged GET requests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::ReaderBackend;
use crate::cache::RangeCache;
use crate::config::S3Options;
use crate::error::{OmReaderError, Result};

/// Backend reading byte ranges of one S3 object.
pub struct S3Backend {
    store: Arc<dyn ObjectStore>,
    options: S3Options,
    location: Path,
    cache: Option<RangeCache>,
    len: OnceCell<u64>,
}

impl S3Backend {
    /// Create a client for the configured region and bucket.
    ///
    /// With `skip_signature` requests go out unsigned; otherwise credentials
    /// are taken from the standard `AWS_*` environment variables.
    pub fn new(options: S3Options) -> Result<Self> {
        let store = builder(&options)
            .build()
            .map_err(|e| OmReaderError::open_failed(format!("failed to create S3 client: {}", e)))?;

        Ok(Self::with_store(Arc::new(store), options))
    }

    /// Use an existing object store (e.g. an in-memory store in tests).
    pub fn with_store(store: Arc<dyn ObjectStore>, options: S3Options) -> Self {
        let location = Path::from(options.key.as_str());
        let cache = options
            .cache_enabled
            .then(|| RangeCache::new(options.cache_capacity));

        Self {
            store,
            options,
            location,
            cache,
            len: OnceCell::new(),
        }
    }

    pub fn region(&self) -> &str {
        &self.options.region
    }

    pub fn bucket(&self) -> &str {
        &self.options.bucket
    }

    pub fn key(&self) -> &str {
        &self.options.key
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn cache(&self) -> Option<&RangeCache> {
        self.cache.as_ref()
    }

    pub fn url(&self) -> String {
        self.options.url()
    }

    async fn fetch(&self, offset: u64, size: u64) -> Result<Bytes> {
        let range = offset as usize..offset.saturating_add(size) as usize;
        let data = self.store.get_range(&self.location, range).await?;
        debug!(offset, size, "Fetched range");
        Ok(data)
    }
}

fn builder(options: &S3Options) -> AmazonS3Builder {
    AmazonS3Builder::from_env()
        .with_region(&options.region)
        .with_bucket_name(&options.bucket)
        .with_skip_signature(options.skip_signature)
}

#[async_trait]
impl ReaderBackend for S3Backend {
    #[instrument(skip(self), fields(bucket = %self.options.bucket, key = %self.options.key))]
    async fn count(&self) -> Result<u64> {
        let len = self
            .len
            .get_or_try_init(|| async {
                let meta = self.store.head(&self.location).await?;
                Ok::<u64, OmReaderError>(meta.size as u64)
            })
            .await?;
        Ok(*len)
    }

    #[instrument(skip(self), fields(bucket = %self.options.bucket, key = %self.options.key))]
    async fn get_bytes(&self, offset: u64, size: u64) -> Result<Bytes> {
        let len = self.count().await?;
        let end = offset.saturating_add(size);
        if end > len {
            return Err(OmReaderError::OutOfBounds { offset, end, len });
        }

        let Some(cache) = &self.cache else {
            return self.fetch(offset, size).await;
        };

        let key = (offset, size);
        if let Some(data) = cache.get(&key).await {
            return Ok(data);
        }
        let data = self.fetch(offset, size).await?;
        cache.insert(key, data.clone()).await;
        Ok(data)
    }
}
