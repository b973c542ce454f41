//! Turning a flat slice into a heatmap grid.

use om_reader::DimRange;

use crate::error::{ViewerError, ViewerResult};
use crate::state::AxisRoles;

/// One range per axis: the single `index` on the time axis, everything elsewhere.
pub fn slice_ranges(dimensions: &[u64], roles: &AxisRoles, index: u64) -> Vec<DimRange> {
    dimensions
        .iter()
        .enumerate()
        .map(|(axis, &size)| {
            if axis == roles.time {
                DimRange::single(index)
            } else {
                DimRange::full(size)
            }
        })
        .collect()
}

/// Reshape a flat row-major sequence into `rows × cols`.
///
/// The sequence must hold exactly `rows * cols` values.
pub fn reshape(data: &[f32], rows: usize, cols: usize) -> ViewerResult<Vec<Vec<f32>>> {
    let expected = rows * cols;
    if data.len() != expected {
        return Err(ViewerError::ShapeMismatch {
            rows,
            cols,
            expected,
            actual: data.len(),
        });
    }
    if cols == 0 {
        return Ok(vec![Vec::new(); rows]);
    }
    Ok(data.chunks_exact(cols).map(<[f32]>::to_vec).collect())
}

/// Min and max over all non-NaN values.
///
/// Returns `(+∞, −∞)` when there are none.
pub fn value_range(data: &[f32]) -> (f32, f32) {
    data.iter()
        .filter(|v| !v.is_nan())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        })
}
