//! Log10 transform of masked concentration grids.

use chla_common::MaskedGrid;
use tracing::debug;

/// Mask non-positive cells, then take log10 of the rest.
///
/// Cells that were already masked stay masked.
pub fn log10_masked(grid: &MaskedGrid) -> MaskedGrid {
    let positive = grid.mask_where(|v| v <= 0.0);
    let logged = positive.map_valid(f32::log10);

    debug!(
        cells = logged.len(),
        valid = logged.valid_count(),
        min_max = ?logged.min_max(),
        "Applied log10 transform"
    );
    logged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log10_values() {
        let grid = MaskedGrid::from_values(3, 1, vec![0.01, 1.0, 100.0]).unwrap();
        let logged = log10_masked(&grid);
        assert!((logged.get(0, 0).unwrap() + 2.0).abs() < 1e-6);
        assert!(logged.get(0, 1).unwrap().abs() < 1e-6);
        assert!((logged.get(0, 2).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_log10_masks_non_positive() {
        let grid = MaskedGrid::from_values(3, 1, vec![0.0, -1.0, 5.0]).unwrap();
        let logged = log10_masked(&grid);
        assert_eq!(logged.mask(), &[true, true, false]);
    }
}
