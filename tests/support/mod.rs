//! Test helpers for csvtab integration tests
//!
//! Fixture files are either static files under `tests/data` or written to a
//! fresh temporary directory per test.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

#[allow(dead_code)]
/// Helper function to create a temp directory for tests, respecting CARGO_TARGET_TMPDIR if set
pub fn create_temp_dir() -> Result<TempDir, Box<dyn std::error::Error>> {
    if let Ok(cargo_target_tmpdir) = env::var("CARGO_TARGET_TMPDIR") {
        fs::create_dir_all(&cargo_target_tmpdir)?;
        Ok(TempDir::new_in(cargo_target_tmpdir)?)
    } else {
        Ok(TempDir::new()?)
    }
}

#[allow(dead_code)]
/// Helper function to write a fixture file with custom content
pub fn create_custom_file(
    dir: &Path,
    filename: &str,
    content: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Path to the static players fixture
#[allow(dead_code)]
pub fn players_file() -> PathBuf {
    PathBuf::from("tests/data/players.csv")
}

/// Path to the static coaches fixture
#[allow(dead_code)]
pub fn coaches_file() -> PathBuf {
    PathBuf::from("tests/data/coaches.csv")
}
