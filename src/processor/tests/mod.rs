//! Integration tests for the processor module
//!
//! Tests dataset discovery and per-country processing against mock dataset
//! caches built in temporary directories.

pub mod discovery_tests;
pub mod pipeline_tests;

use std::fs;
use std::path::Path;

/// Write a `cod-ab-<iso3>/dataset.json` manifest under `cache`
pub(crate) fn write_manifest(cache: &Path, country: &str, manifest: &str) {
    let dir = cache.join(format!("cod-ab-{}", country.to_lowercase()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("dataset.json"), manifest).unwrap();
}
