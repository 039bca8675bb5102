//! Structural diff tool adapter.

use twinbuild_common::config::CommandSpec;
use twinbuild_common::constants::{IMAGE_A_PLACEHOLDER, IMAGE_B_PLACEHOLDER};
use twinbuild_common::error::Result;
use twinbuild_common::types::ImageRef;
use twinbuild_diff::StructuralDiff;

use crate::process;

/// Produces the structural diff between two images.
pub trait DiffTool: Send + Sync {
    /// Compares `image_a` with `image_b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails or its output is malformed.
    fn diff(&self, image_a: &ImageRef, image_b: &ImageRef) -> Result<StructuralDiff>;
}

/// Diff tool that prints the JSON report on stdout, like `atomic diff --json`.
#[derive(Debug, Clone)]
pub struct CommandDiffTool {
    spec: CommandSpec,
}

impl CommandDiffTool {
    /// Creates the adapter from a command template.
    #[must_use]
    pub const fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl DiffTool for CommandDiffTool {
    fn diff(&self, image_a: &ImageRef, image_b: &ImageRef) -> Result<StructuralDiff> {
        tracing::info!(image_a = %image_a, image_b = %image_b, "comparing images");
        let args = self.spec.render(&[
            (IMAGE_A_PLACEHOLDER, image_a.as_str()),
            (IMAGE_B_PLACEHOLDER, image_b.as_str()),
        ]);
        let stdout = process::run_capture(&self.spec.program, &args)?;
        StructuralDiff::from_json_str(&stdout, image_a, image_b)
    }
}
