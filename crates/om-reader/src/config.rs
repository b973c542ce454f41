//! Configuration for backend selection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ceiling for files buffered in memory by the HTTP backend (500 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Configuration for all backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Options for `http://` and `https://` inputs.
    #[serde(default)]
    pub http: HttpOptions,

    /// Options for `s3://` inputs.
    #[serde(default)]
    pub s3: S3Options,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            http: HttpOptions::from_env(),
            s3: S3Options::from_env(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.http.validate()?;
        self.s3.validate()
    }
}

/// Options for the buffered HTTP backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOptions {
    /// Maximum number of bytes buffered in memory.
    pub max_file_size: u64,

    /// Log each received chunk at debug level.
    pub debug: bool,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            debug: true,
            request_timeout_secs: 600,
            connect_timeout_secs: 30,
        }
    }
}

impl HttpOptions {
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(val) = std::env::var("OM_HTTP_MAX_FILE_SIZE") {
            if let Ok(size) = val.parse() {
                options.max_file_size = size;
            }
        }

        if let Ok(val) = std::env::var("OM_HTTP_DEBUG") {
            options.debug = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("OM_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                options.request_timeout_secs = secs;
            }
        }

        options
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_size == 0 {
            return Err("http max_file_size must be > 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("http request_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Options for the S3 backend.
///
/// The target object is taken from these options, never from the `s3://`
/// input string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Options {
    /// AWS region of the bucket.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Object key inside the bucket.
    pub key: String,
    /// Memoize fetched byte ranges.
    pub cache_enabled: bool,
    /// Number of ranges kept by the cache.
    pub cache_capacity: usize,
    /// Send unsigned requests (public buckets, no credentials needed).
    pub skip_signature: bool,
}

impl Default for S3Options {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            bucket: "openmeteo".to_string(),
            key: "data_spatial/dwd_icon_d2/2025/04/26/0000Z/temperature_2m.om".to_string(),
            cache_enabled: true,
            cache_capacity: 256,
            skip_signature: true,
        }
    }
}

impl S3Options {
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(val) = std::env::var("OM_S3_REGION") {
            options.region = val;
        }
        if let Ok(val) = std::env::var("OM_S3_BUCKET") {
            options.bucket = val;
        }
        if let Ok(val) = std::env::var("OM_S3_KEY") {
            options.key = val;
        }
        if let Ok(val) = std::env::var("OM_S3_CACHE") {
            options.cache_enabled = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("OM_S3_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                options.cache_capacity = capacity;
            }
        }
        if let Ok(val) = std::env::var("OM_S3_SKIP_SIGNATURE") {
            options.skip_signature = val.to_lowercase() == "true" || val == "1";
        }

        options
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("s3 bucket must not be empty".to_string());
        }
        if self.key.is_empty() {
            return Err("s3 key must not be empty".to_string());
        }
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err("s3 cache_capacity must be > 0 when cache is enabled".to_string());
        }
        Ok(())
    }

    /// The `s3://bucket/key` location these options point at.
    pub fn url(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
