//! Synthetic raster generators.
//!
//! These generators create predictable, verifiable pixel patterns that can be
//! used across the test suite. All grids are row-major `Vec<f64>`.

/// Creates a test grid with predictable values.
///
/// Each pixel value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a pixel landed in the right place by
/// checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates an elevation-like grid in metres.
///
/// A smooth ridge rising from 100 m at the western edge to 1100 m at the
/// eastern edge, with a gentle north-south undulation.
pub fn create_elevation_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 / width.max(1) as f64;
            let y = row as f64 / height.max(1) as f64;
            data.push(100.0 + x * 1000.0 + (y * std::f64::consts::PI).sin() * 50.0);
        }
    }
    data
}

/// Replaces every `nth` pixel of a grid with `nodata`.
///
/// Returns the number of pixels replaced.
pub fn punch_nodata(data: &mut [f64], nth: usize, nodata: f64) -> usize {
    if nth == 0 {
        return 0;
    }
    let mut replaced = 0;
    for value in data.iter_mut().step_by(nth) {
        *value = nodata;
        replaced += 1;
    }
    replaced
}
