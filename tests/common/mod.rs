/*!
 * Common test utilities for the yadtwai test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

use yadtwai::app_config::Config;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
/// as needed
pub fn create_test_file(dir: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample markdown document for testing
pub fn create_test_markdown(dir: &Path, relative: &str) -> Result<PathBuf> {
    let content = "# Getting started\n\nInstall the tool and run it.\n";
    create_test_file(dir, relative, content)
}

/// Builds a configuration rooted in a temporary directory: `docs/` as the
/// source tree, `out/$langcode$/` as the output pattern and the memory
/// database inside the root
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.files.source_dir = root.join("docs");
    config.files.output_dir = root
        .join("out")
        .join("$langcode$")
        .to_string_lossy()
        .into_owned();
    config.memory.path = root.join("memory.db");
    config
}

/// Path of the output file a run writes for a source file and language
pub fn output_file(config: &Config, language: &str, relative: &str) -> PathBuf {
    PathBuf::from(config.files.output_dir.replace("$langcode$", language)).join(relative)
}
