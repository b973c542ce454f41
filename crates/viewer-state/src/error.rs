//! Error types for the viewer controller.

use om_reader::OmReaderError;
use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Errors surfaced through `ViewerState::error`.
///
/// The `Display` text is what observers see.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Reader not initialized")]
    ReaderNotInitialized,

    #[error("Data must have at least 2 dimensions")]
    TooFewDimensions(usize),

    #[error("Slice has {actual} values, expected {rows}x{cols} = {expected}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Reader(#[from] OmReaderError),
}

impl From<serde_yaml::Error> for ViewerError {
    fn from(err: serde_yaml::Error) -> Self {
        ViewerError::Config(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ViewerError::ReaderNotInitialized.to_string(), "Reader not initialized");
        assert_eq!(
            ViewerError::TooFewDimensions(1).to_string(),
            "Data must have at least 2 dimensions"
        );
        let err = ViewerError::from(OmReaderError::read_failed("chunk 3 corrupt"));
        assert_eq!(err.to_string(), "failed to read data: chunk 3 corrupt");
    }
}
