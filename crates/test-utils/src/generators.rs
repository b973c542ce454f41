//! Test data generators with predictable values.

/// Creates a row-major array whose value at each index is its flat offset.
///
/// For dimensions `[t, r, c]` the value at `(i, j, k)` is `(i * r + j) * c + k`,
/// so any slice can be checked against its coordinates.
///
/// ```
/// use test_utils::create_test_cube;
///
/// let cube = create_test_cube(&[3, 4, 5]);
/// assert_eq!(cube.len(), 60);
/// assert_eq!(cube[1 * 20 + 2 * 5 + 3], 33.0);
/// ```
pub fn create_test_cube(dimensions: &[u64]) -> Vec<f32> {
    let len: u64 = dimensions.iter().product();
    (0..len).map(|v| v as f32).collect()
}
