//! Defaults shared by the harness and the CLI.

/// Directory holding one build context per test case.
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// Repository prefix for images built by the harness.
pub const DEFAULT_IMAGE_REPO: &str = "test";

/// Tag for images built through the daemon API.
pub const REFERENCE_TAG: &str = "dockerapi";

/// Tag for images built by the alternative builder.
pub const CANDIDATE_TAG: &str = "ocexdockerbuild";

/// Placeholder replaced by the build-context directory in command templates.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder replaced by the image reference in command templates.
pub const IMAGE_PLACEHOLDER: &str = "{image}";

/// Placeholder for the first image passed to the diff tool.
pub const IMAGE_A_PLACEHOLDER: &str = "{image_a}";

/// Placeholder for the second image passed to the diff tool.
pub const IMAGE_B_PLACEHOLDER: &str = "{image_b}";

/// Key of the changed-files list in a diff report.
pub const FILES_DIFFER_KEY: &str = "files_differ";

/// Key of the per-image unique files list in a diff report.
pub const UNIQUE_FILES_KEY: &str = "unique_files";

