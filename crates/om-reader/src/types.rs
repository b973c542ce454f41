//! OM format enumerations and range types.

use serde::{Deserialize, Serialize};

/// Compression kind of an OM variable.
///
/// The discriminants are the raw codes stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompressionType {
    PforDelta2dInt16 = 0,
    FpxXor2d = 1,
    PforDelta2d = 2,
    PforDelta2dInt16Logarithmic = 3,
    None = 4,
}

impl CompressionType {
    pub const ALL: [CompressionType; 5] = [
        Self::PforDelta2dInt16,
        Self::FpxXor2d,
        Self::PforDelta2d,
        Self::PforDelta2dInt16Logarithmic,
        Self::None,
    ];

    /// Reverse lookup from a raw code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Symbolic name as used by the reader library.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PforDelta2dInt16 => "PforDelta2dInt16",
            Self::FpxXor2d => "FpxXor2d",
            Self::PforDelta2d => "PforDelta2d",
            Self::PforDelta2dInt16Logarithmic => "PforDelta2dInt16Logarithmic",
            Self::None => "None",
        }
    }
}

impl std::fmt::Display for CompressionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Element data type of an OM variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OmDataType {
    None = 0,
    Int8 = 1,
    Uint8 = 2,
    Int16 = 3,
    Uint16 = 4,
    Int32 = 5,
    Uint32 = 6,
    Int64 = 7,
    Uint64 = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Int8Array = 12,
    Uint8Array = 13,
    Int16Array = 14,
    Uint16Array = 15,
    Int32Array = 16,
    Uint32Array = 17,
    Int64Array = 18,
    Uint64Array = 19,
    FloatArray = 20,
    DoubleArray = 21,
    StringArray = 22,
}

impl OmDataType {
    pub const ALL: [OmDataType; 23] = [
        Self::None,
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Int64,
        Self::Uint64,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Int8Array,
        Self::Uint8Array,
        Self::Int16Array,
        Self::Uint16Array,
        Self::Int32Array,
        Self::Uint32Array,
        Self::Int64Array,
        Self::Uint64Array,
        Self::FloatArray,
        Self::DoubleArray,
        Self::StringArray,
    ];

    /// Reverse lookup from a raw code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Whether this type describes an array variable (as opposed to a scalar).
    pub fn is_array(&self) -> bool {
        self.code() >= Self::Int8Array.code()
    }

    /// Symbolic name as used by the reader library.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Int8 => "Int8",
            Self::Uint8 => "Uint8",
            Self::Int16 => "Int16",
            Self::Uint16 => "Uint16",
            Self::Int32 => "Int32",
            Self::Uint32 => "Uint32",
            Self::Int64 => "Int64",
            Self::Uint64 => "Uint64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::Int8Array => "Int8Array",
            Self::Uint8Array => "Uint8Array",
            Self::Int16Array => "Int16Array",
            Self::Uint16Array => "Uint16Array",
            Self::Int32Array => "Int32Array",
            Self::Uint32Array => "Uint32Array",
            Self::Int64Array => "Int64Array",
            Self::Uint64Array => "Uint64Array",
            Self::FloatArray => "FloatArray",
            Self::DoubleArray => "DoubleArray",
            Self::StringArray => "StringArray",
        }
    }
}

impl std::fmt::Display for OmDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Half-open index range `[start, end)` along one dataset axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimRange {
    pub start: u64,
    pub end: u64,
}

impl DimRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// The full extent of an axis of the given size.
    pub fn full(size: u64) -> Self {
        Self::new(0, size)
    }

    /// A single index.
    pub fn single(index: u64) -> Self {
        Self::new(index, index + 1)
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<std::ops::Range<u64>> for DimRange {
    fn from(range: std::ops::Range<u64>) -> Self {
        Self::new(range.start, range.end)
    }
}
