//! Viewer state record and its parts.

use std::sync::Arc;

use om_reader::{CompressionType, OmDataType, OmReader};
use serde::{Deserialize, Serialize};

/// Which dataset axes are shown as time, rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRoles {
    pub time: usize,
    pub row: usize,
    pub col: usize,
}

impl Default for AxisRoles {
    fn default() -> Self {
        Self {
            time: 2,
            row: 0,
            col: 1,
        }
    }
}

impl AxisRoles {
    pub fn new(time: usize, row: usize, col: usize) -> Self {
        Self { time, row, col }
    }

    /// All three roles name different axes.
    pub fn is_distinct(&self) -> bool {
        self.time != self.row && self.time != self.col && self.row != self.col
    }

    /// Distinct and every role addresses an existing axis.
    pub fn fits(&self, ndims: usize) -> bool {
        self.is_distinct() && self.time < ndims && self.row < ndims && self.col < ndims
    }
}

/// Descriptive snapshot of the opened variable. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub children: Option<u32>,
    pub variable_name: Option<String>,
    pub dimensions: Vec<u64>,
    pub compression: Option<String>,
    pub data_type: Option<String>,
    pub chunk_dimensions: Vec<u64>,
}

impl Metadata {
    /// Build from raw reader values, translating codes to symbolic names.
    pub fn from_codes(
        children: u32,
        variable_name: Option<String>,
        dimensions: Vec<u64>,
        compression: u8,
        data_type: u8,
        chunk_dimensions: Vec<u64>,
    ) -> Self {
        Self {
            children: Some(children),
            variable_name,
            dimensions,
            compression: CompressionType::from_code(compression).map(|c| c.as_str().to_string()),
            data_type: OmDataType::from_code(data_type).map(|t| t.as_str().to_string()),
            chunk_dimensions,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Plot-ready heatmap payload, serialized in the charting library's trace shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    /// Row-major grid, `rows × cols`.
    #[serde(rename = "z")]
    pub grid: Vec<Vec<f32>>,
    #[serde(rename = "type")]
    pub kind: String,
    pub colorscale: String,
    /// Smallest non-NaN value, `+∞` if there is none.
    #[serde(rename = "zmin")]
    pub value_min: f32,
    /// Largest non-NaN value, `−∞` if there is none.
    #[serde(rename = "zmax")]
    pub value_max: f32,
    /// Time index the grid was read at. May lag `current_index` while a
    /// newer read is in flight.
    #[serde(skip)]
    pub index: u64,
}

impl PlotData {
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }
}

/// The single mutable record held by the controller.
#[derive(Clone, Default)]
pub struct ViewerState {
    pub reader: Option<Arc<dyn OmReader>>,
    pub current_index: u64,
    pub max_index: u64,
    pub dimensions: Vec<u64>,
    pub axis_roles: AxisRoles,
    pub metadata: Metadata,
    pub plot: Option<Arc<PlotData>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ViewerState {
    /// Empty state using the given axis roles.
    pub fn initial(axis_roles: AxisRoles) -> Self {
        Self {
            axis_roles,
            ..Default::default()
        }
    }

    pub fn has_reader(&self) -> bool {
        self.reader.is_some()
    }

    pub fn can_step_backward(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_step_forward(&self) -> bool {
        self.current_index < self.max_index
    }

    /// Serializable view without the reader handle.
    pub fn snapshot(&self) -> ViewerSnapshot<'_> {
        ViewerSnapshot {
            has_reader: self.has_reader(),
            current_index: self.current_index,
            max_index: self.max_index,
            dimensions: &self.dimensions,
            axis_roles: self.axis_roles,
            metadata: &self.metadata,
            plot: self.plot.as_deref(),
            loading: self.loading,
            error: self.error.as_deref(),
        }
    }
}

/// Last valid index along an axis, clamped to 0 for empty or missing axes.
pub(crate) fn max_index_for(dimensions: &[u64], time_axis: usize) -> u64 {
    dimensions
        .get(time_axis)
        .map_or(0, |size| size.saturating_sub(1))
}

impl std::fmt::Debug for ViewerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerState")
            .field("reader", &self.reader.as_ref().map(|_| "OmReader"))
            .field("current_index", &self.current_index)
            .field("max_index", &self.max_index)
            .field("dimensions", &self.dimensions)
            .field("axis_roles", &self.axis_roles)
            .field("metadata", &self.metadata)
            .field("plot", &self.plot.as_ref().map(|p| (p.rows(), p.cols())))
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish()
    }
}

/// Readers compare by identity.
impl PartialEq for ViewerState {
    fn eq(&self, other: &Self) -> bool {
        let same_reader = match (&self.reader, &other.reader) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_reader
            && self.current_index == other.current_index
            && self.max_index == other.max_index
            && self.dimensions == other.dimensions
            && self.axis_roles == other.axis_roles
            && self.metadata == other.metadata
            && self.plot == other.plot
            && self.loading == other.loading
            && self.error == other.error
    }
}

/// Serializable view of [`ViewerState`].
#[derive(Debug, Serialize)]
pub struct ViewerSnapshot<'a> {
    pub has_reader: bool,
    pub current_index: u64,
    pub max_index: u64,
    pub dimensions: &'a [u64],
    pub axis_roles: AxisRoles,
    pub metadata: &'a Metadata,
    pub plot: Option<&'a PlotData>,
    pub loading: bool,
    pub error: Option<&'a str>,
}
