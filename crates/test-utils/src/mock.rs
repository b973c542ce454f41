//! In-memory fakes for the reader seam.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use om_reader::{
    Backend, CompressionType, DimRange, OmDataType, OmReader, OmReaderError, ReaderOpener,
    Result,
};

enum Values {
    /// Full row-major array; reads return the requested hyperslab.
    Array(Vec<f32>),
    /// Every read returns these values regardless of ranges.
    Fixed(Vec<f32>),
}

/// Reader over an in-memory array that records every read request.
pub struct MockReader {
    dimensions: Vec<u64>,
    chunk_dimensions: Vec<u64>,
    name: Option<String>,
    children: u32,
    compression: u8,
    data_type: u8,
    values: Values,
    metadata_error: Option<String>,
    read_error: Option<String>,
    read_delay: Option<Duration>,
    reads: Mutex<Vec<Vec<DimRange>>>,
}

impl MockReader {
    /// A reader whose values are their flat offsets (see `create_test_cube`).
    pub fn new(dimensions: Vec<u64>) -> Self {
        let values = crate::create_test_cube(&dimensions);
        Self::with_array(dimensions, values)
    }

    /// A reader over the given row-major array.
    pub fn with_array(dimensions: Vec<u64>, values: Vec<f32>) -> Self {
        Self {
            chunk_dimensions: dimensions.iter().map(|&d| d.clamp(1, 16)).collect(),
            dimensions,
            name: Some("temperature_2m".to_string()),
            children: 0,
            compression: CompressionType::PforDelta2dInt16.code(),
            data_type: OmDataType::FloatArray.code(),
            values: Values::Array(values),
            metadata_error: None,
            read_error: None,
            read_delay: None,
            reads: Mutex::new(Vec::new()),
        }
    }

    /// Every read returns `values` as-is.
    pub fn returning(mut self, values: Vec<f32>) -> Self {
        self.values = Values::Fixed(values);
        self
    }

    pub fn with_codes(mut self, compression: u8, data_type: u8) -> Self {
        self.compression = compression;
        self.data_type = data_type;
        self
    }

    /// Name and child count lookups fail; dimensions still work.
    pub fn failing_metadata(mut self, msg: impl Into<String>) -> Self {
        self.metadata_error = Some(msg.into());
        self
    }

    pub fn failing_reads(mut self, msg: impl Into<String>) -> Self {
        self.read_error = Some(msg.into());
        self
    }

    /// Sleep before answering each read.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Ranges of every read so far, in order.
    pub fn reads(&self) -> Vec<Vec<DimRange>> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    fn check_metadata(&self) -> Result<()> {
        match &self.metadata_error {
            Some(msg) => Err(OmReaderError::invalid_metadata(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OmReader for MockReader {
    fn number_of_children(&self) -> Result<u32> {
        self.check_metadata()?;
        Ok(self.children)
    }

    fn name(&self) -> Result<Option<String>> {
        self.check_metadata()?;
        Ok(self.name.clone())
    }

    fn dimensions(&self) -> Result<Vec<u64>> {
        Ok(self.dimensions.clone())
    }

    fn compression(&self) -> Result<u8> {
        Ok(self.compression)
    }

    fn data_type(&self) -> Result<u8> {
        Ok(self.data_type)
    }

    fn chunk_dimensions(&self) -> Result<Vec<u64>> {
        Ok(self.chunk_dimensions.clone())
    }

    async fn read(&self, data_type: OmDataType, ranges: &[DimRange]) -> Result<Vec<f32>> {
        self.reads.lock().unwrap().push(ranges.to_vec());

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.read_error {
            return Err(OmReaderError::read_failed(msg.clone()));
        }
        if data_type != OmDataType::FloatArray {
            return Err(OmReaderError::read_failed(format!(
                "unsupported element type {}",
                data_type
            )));
        }

        match &self.values {
            Values::Fixed(values) => Ok(values.clone()),
            Values::Array(values) => extract(&self.dimensions, values, ranges),
        }
    }
}

/// Copy the hyperslab selected by `ranges` out of a row-major array.
pub fn extract(dimensions: &[u64], values: &[f32], ranges: &[DimRange]) -> Result<Vec<f32>> {
    if ranges.len() != dimensions.len() {
        return Err(OmReaderError::read_failed(format!(
            "expected {} ranges, got {}",
            dimensions.len(),
            ranges.len()
        )));
    }
    for (axis, (range, &size)) in ranges.iter().zip(dimensions).enumerate() {
        if range.start > range.end || range.end > size {
            return Err(OmReaderError::read_failed(format!(
                "range {}..{} out of bounds for axis {} of size {}",
                range.start, range.end, axis, size
            )));
        }
    }
    if ranges.iter().any(DimRange::is_empty) {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(ranges.iter().map(|r| r.len() as usize).product());
    let mut index: Vec<u64> = ranges.iter().map(|r| r.start).collect();
    loop {
        let offset = index
            .iter()
            .zip(dimensions)
            .fold(0u64, |acc, (&i, &size)| acc * size + i);
        out.push(values[offset as usize]);

        // Advance the last axis first, carrying into earlier axes.
        let mut axis = index.len();
        loop {
            if axis == 0 {
                return Ok(out);
            }
            axis -= 1;
            index[axis] += 1;
            if index[axis] < ranges[axis].end {
                break;
            }
            index[axis] = ranges[axis].start;
        }
    }
}

/// Opener handing out queued readers (or errors) and recording backend kinds.
///
/// The last queued entry is reused for every further open.
pub struct MockOpener {
    queue: Mutex<VecDeque<std::result::Result<Arc<MockReader>, String>>>,
    opened: Mutex<Vec<&'static str>>,
}

impl MockOpener {
    pub fn new(reader: Arc<MockReader>) -> Self {
        Self::sequence(vec![Ok(reader)])
    }

    pub fn failing(msg: impl Into<String>) -> Self {
        Self::sequence(vec![Err(msg.into())])
    }

    pub fn sequence(entries: Vec<std::result::Result<Arc<MockReader>, String>>) -> Self {
        Self {
            queue: Mutex::new(entries.into()),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Backend kinds passed to `open`, in order.
    pub fn opened(&self) -> Vec<&'static str> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReaderOpener for MockOpener {
    async fn open(&self, backend: Backend) -> Result<Arc<dyn OmReader>> {
        self.opened.lock().unwrap().push(backend.kind());

        let entry = {
            let mut queue = self.queue.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match entry {
            Some(Ok(reader)) => Ok(reader as Arc<dyn OmReader>),
            Some(Err(msg)) => Err(OmReaderError::open_failed(msg)),
            None => Err(OmReaderError::open_failed("no reader queued")),
        }
    }
}
