//! Locating optional real granules.
//!
//! Synthetic fixtures cover the test suite; real ocean-colour granules are
//! large and not checked in, so tests that want one skip when it is absent.

use std::path::PathBuf;

/// Environment variable naming an extra granule directory.
pub const TEST_DATA_ENV: &str = "CHLA_TEST_DATA";

/// Workspace root, two levels above this crate.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or(manifest_dir)
}

/// Directories searched for granules, in order.
pub fn testdata_dirs() -> Vec<PathBuf> {
    let root = workspace_root();
    let mut dirs = Vec::new();
    if let Ok(dir) = std::env::var(TEST_DATA_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    dirs.push(root.join("testdata"));
    dirs.push(root.join("results/daily/Modis/chla"));
    dirs
}

/// First existing `name` in [`testdata_dirs`].
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    testdata_dirs()
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        let root = workspace_root();
        assert!(root.join("Cargo.toml").exists(), "{:?}", root);
    }

    #[test]
    fn test_missing_file_not_found() {
        assert!(find_test_file("no-such-granule.nc").is_none());
    }
}
