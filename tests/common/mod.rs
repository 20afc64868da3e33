//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use noet_iref::{compiler::build_sources, config::BuildConfig, compiler::BuildOutput};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write `(relative path, content)` pairs below a fresh source directory.
///
/// Returns the temp dir guard and the source root (`<temp_dir>/docs/`).
#[allow(dead_code)]
pub fn create_source_tree(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("docs");
    for (relative, content) in files {
        write_file(&root.join(relative), content);
    }
    (temp_dir, root)
}

#[allow(dead_code)]
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Sequential in-memory build, so generated ids follow document name order.
#[allow(dead_code)]
pub async fn build_in_order(config: BuildConfig, sources: &[(&str, &str)]) -> BuildOutput {
    let sources = sources
        .iter()
        .map(|(name, source)| (name.to_string(), source.to_string()))
        .collect();
    build_sources(&config.sequential(), sources).await.unwrap()
}
