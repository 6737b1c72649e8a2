//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

#[path = "../../src/media/testdata.rs"]
mod testdata;

pub use testdata::{heic, mov};

/// Write `bytes` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}
