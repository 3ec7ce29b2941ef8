//! Tests for input file selection.

use std::fs;
use std::path::Path;

use chla_viewer::InputSelection;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").unwrap();
}

fn names(selection: &InputSelection) -> Vec<String> {
    selection
        .iter()
        .unwrap()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_first_five_nc_files_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "A2020231.nc",
        "A2020225.nc",
        "readme.txt",
        "A2020228.nc",
        "A2020226.nc",
        "A2020230.nc",
        "A2020227.nc",
        "A2020229.nc",
    ] {
        touch(dir.path(), name);
    }

    let selected = names(&InputSelection::new(dir.path(), 5));
    assert_eq!(
        selected,
        vec![
            "A2020225.nc",
            "A2020226.nc",
            "A2020227.nc",
            "A2020228.nc",
            "A2020229.nc",
        ]
    );
}

#[test]
fn test_fewer_files_than_limit() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "b.nc");
    touch(dir.path(), "a.nc");

    assert_eq!(names(&InputSelection::new(dir.path(), 5)), vec!["a.nc", "b.nc"]);
}

#[test]
fn test_subdirectories_are_not_scanned() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "top.nc");
    fs::create_dir(dir.path().join("nested.nc")).unwrap();
    touch(&dir.path().join("nested.nc"), "inner.nc");

    assert_eq!(names(&InputSelection::new(dir.path(), 5)), vec!["top.nc"]);
}

#[test]
fn test_selection_is_restartable() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        touch(dir.path(), &format!("f{i}.nc"));
    }

    let selection = InputSelection::new(dir.path(), 5);
    let first = names(&selection);
    let second = names(&selection);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(names(&InputSelection::new(dir.path(), 5)).is_empty());
}
