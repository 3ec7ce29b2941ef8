//! Tests for BoundingBox operations.

use chla_common::bbox::{BboxParseError, BoundingBox};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    assert_eq!(bbox.min_x, -180.0);
    assert_eq!(bbox.min_y, -90.0);
    assert_eq!(bbox.max_x, 180.0);
    assert_eq!(bbox.max_y, 90.0);
    assert!(bbox.is_valid());
}

#[test]
fn test_from_coords_handles_descending_latitude() {
    let lon = [139.0, 139.5, 140.0];
    let lat = [36.0, 35.5, 35.0, f64::NAN];
    let bbox = BoundingBox::from_coords(&lon, &lat).unwrap();
    assert_eq!(bbox, BoundingBox::new(139.0, 35.0, 140.0, 36.0));
}

#[test]
fn test_from_coords_empty() {
    assert!(BoundingBox::from_coords(&[], &[1.0]).is_none());
    assert!(BoundingBox::from_coords(&[1.0], &[f64::NAN]).is_none());
}

// ============================================================================
// Parsing tests
// ============================================================================

#[test]
fn test_parse_wrong_part_count() {
    let err = BoundingBox::from_csv("1,2,3").unwrap_err();
    assert!(matches!(err, BboxParseError::InvalidFormat(_)));
}

#[test]
fn test_parse_bad_number() {
    let err = BoundingBox::from_csv("1,abc,3,4").unwrap_err();
    match err {
        BboxParseError::InvalidNumber(part) => assert_eq!(part, "abc"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_inverted() {
    let err = BoundingBox::from_csv("140,35,139,36").unwrap_err();
    assert!(matches!(err, BboxParseError::Inverted(_)));
}

// ============================================================================
// Geometry tests
// ============================================================================

#[test]
fn test_crop_window_inside_granule() {
    let granule = BoundingBox::new(130.0, 30.0, 145.0, 40.0);
    let window = BoundingBox::from_lat_lon(34.5, 35.4, 138.8, 139.9);
    assert!(granule.intersects(&window));
    assert!(window.intersects(&granule));
}

#[test]
fn test_disjoint_boxes() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
    assert!(!a.intersects(&c));
    let beside = BoundingBox::new(10.5, 0.0, 12.0, 10.0);
    assert!(!a.intersects(&beside));
}

#[test]
fn test_width_height() {
    let bbox = BoundingBox::from_lat_lon(34.5, 35.5, 138.5, 140.0);
    assert_eq!(bbox.width(), 1.5);
    assert_eq!(bbox.height(), 1.0);
}
