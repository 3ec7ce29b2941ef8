//! Tests for the log10 transform.

use chla_common::MaskedGrid;
use renderer::log10_masked;
use test_utils::{assert_approx_eq, create_chlorophyll_grid, create_grid_with_nans};

#[test]
fn test_non_positive_values_are_masked() {
    let grid = MaskedGrid::from_values(5, 1, vec![-3.0, 0.0, -0.0, 1e-6, 2.0]).unwrap();
    let logged = log10_masked(&grid);
    assert_eq!(logged.mask(), &[true, true, true, false, false]);
}

#[test]
fn test_round_trip_for_positive_values() {
    let values = create_chlorophyll_grid(12, 9);
    let grid = MaskedGrid::from_values(12, 9, values.clone()).unwrap();
    let logged = log10_masked(&grid);

    for (i, &v) in values.iter().enumerate() {
        let (row, col) = (i / 12, i % 12);
        if v > 0.0 {
            let back = 10f64.powf(logged.get(row, col).unwrap() as f64);
            assert_approx_eq!(back, v, v as f64 * 1e-5);
        } else {
            assert!(logged.is_masked(row, col));
        }
    }
}

#[test]
fn test_existing_mask_preserved() {
    let grid = MaskedGrid::new(3, 1, vec![10.0, 100.0, 1000.0], vec![false, true, false]).unwrap();
    let logged = log10_masked(&grid);
    assert!(logged.is_masked(0, 1));
    assert_approx_eq!(logged.get(0, 2).unwrap(), 3.0, 1e-6);
}

#[test]
fn test_nan_cells_stay_masked() {
    let values = create_grid_with_nans(4, 4, &[(1, 1)]);
    let grid = MaskedGrid::from_values(4, 4, values).unwrap();
    let logged = log10_masked(&grid);
    assert!(logged.is_masked(1, 1));
    // column 0 is value 0 + row: only row 0 is zero
    assert!(logged.is_masked(0, 0));
    assert!(!logged.is_masked(1, 0));
}

#[test]
fn test_all_masked_grid() {
    let grid = MaskedGrid::from_values(2, 2, vec![0.0; 4]).unwrap();
    let logged = log10_masked(&grid);
    assert_eq!(logged.valid_count(), 0);
    assert_eq!(logged.min_max(), None);
}
