//! Test data generators for synthetic ocean-colour data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/sliced correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid with chlorophyll-like concentrations in mg m^-3.
///
/// Values grow log-linearly from 0.01 (top-left) to 100 (bottom-right),
/// so log10 of the data spans [-2, 2]. Every cell in the first column is
/// `0.0` to stand in for land/cloud, which a log transform must mask.
pub fn create_chlorophyll_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = (width + height).saturating_sub(2).max(1) as f32;
    for row in 0..height {
        for col in 0..width {
            if col == 0 {
                data.push(0.0);
                continue;
            }
            let t = (row + col) as f32 / span;
            data.push(10f32.powf(-2.0 + 4.0 * t));
        }
    }
    data
}

/// Creates a regularly spaced coordinate axis.
///
/// # Example
///
/// ```
/// use test_utils::regular_axis;
///
/// let lat = regular_axis(36.0, -0.5, 5);
/// assert_eq!(lat, vec![36.0, 35.5, 35.0, 34.5, 34.0]);
/// ```
pub fn regular_axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// Creates a grid with NaN values at specified positions.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `nan_positions` - List of (col, row) positions to set as NaN
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = create_test_grid(width, height);
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}
