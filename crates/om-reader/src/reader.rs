//! Reader session traits.
//!
//! Decoding OM files is the job of an external reader library. These traits
//! are the seam it plugs into: an [`ReaderOpener`] turns a [`Backend`] into an
//! open [`OmReader`] session.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::Backend;
use crate::error::Result;
use crate::types::{DimRange, OmDataType};

/// An open session over one OM variable.
///
/// Metadata accessors return raw codes; use [`crate::CompressionType::from_code`]
/// and [`OmDataType::from_code`] for symbolic names.
#[async_trait]
pub trait OmReader: Send + Sync {
    /// Number of child variables.
    fn number_of_children(&self) -> Result<u32>;

    /// Variable name, if the file stores one.
    fn name(&self) -> Result<Option<String>>;

    /// Size of each axis.
    fn dimensions(&self) -> Result<Vec<u64>>;

    /// Raw compression code.
    fn compression(&self) -> Result<u8>;

    /// Raw element data type code.
    fn data_type(&self) -> Result<u8>;

    /// Chunk size along each axis.
    fn chunk_dimensions(&self) -> Result<Vec<u64>>;

    /// Read a hyperslab, one range per axis, as a flat row-major sequence.
    ///
    /// # Arguments
    /// * `data_type` - Element type to decode as
    /// * `ranges` - Half-open range per axis, in axis order
    async fn read(&self, data_type: OmDataType, ranges: &[DimRange]) -> Result<Vec<f32>>;
}

/// Opens reader sessions against a backend.
#[async_trait]
pub trait ReaderOpener: Send + Sync {
    async fn open(&self, backend: Backend) -> Result<Arc<dyn OmReader>>;
}

#[async_trait]
impl<T: ReaderOpener + ?Sized> ReaderOpener for Arc<T> {
    async fn open(&self, backend: Backend) -> Result<Arc<dyn OmReader>> {
        (**self).open(backend).await
    }
}
