//! Test case discovery.
//!
//! Each immediate subdirectory of the tests directory is a build context
//! and therefore one test case, named after the directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use twinbuild_common::error::{Result, TwinbuildError};

/// A build context to be built by both builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Directory name, also used in image names.
    pub name: String,
    /// Path to the build context.
    pub context_dir: PathBuf,
}

/// Lists test cases under `tests_dir`, sorted by name.
///
/// Hidden directories and plain files are skipped, as are directory names
/// that are not valid UTF-8 (they cannot form an image name).
///
/// # Errors
///
/// Returns `TwinbuildError::NotFound` if `tests_dir` is not a directory,
/// or `TwinbuildError::Io` if it cannot be read.
pub fn discover_cases(tests_dir: &Path) -> Result<Vec<TestCase>> {
    if !tests_dir.is_dir() {
        return Err(TwinbuildError::NotFound {
            kind: "tests directory",
            id: tests_dir.display().to_string(),
        });
    }
    let io_err = |e| TwinbuildError::Io {
        path: tests_dir.to_path_buf(),
        source: e,
    };

    let mut cases = Vec::new();
    for entry in std::fs::read_dir(tests_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 directory name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        cases.push(TestCase {
            name,
            context_dir: entry.path(),
        });
    }
    cases.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::info!(dir = %tests_dir.display(), count = cases.len(), "discovered test cases");
    Ok(cases)
}

/// Keeps only the cases named in `only`; an empty filter keeps everything.
///
/// # Errors
///
/// Returns `TwinbuildError::NotFound` for a requested name with no case.
pub fn select_cases(cases: Vec<TestCase>, only: &[String]) -> Result<Vec<TestCase>> {
    if only.is_empty() {
        return Ok(cases);
    }
    if let Some(missing) = only.iter().find(|n| !cases.iter().any(|c| &c.name == *n)) {
        return Err(TwinbuildError::NotFound {
            kind: "test case",
            id: missing.clone(),
        });
    }
    Ok(cases.into_iter().filter(|c| only.contains(&c.name)).collect())
}
