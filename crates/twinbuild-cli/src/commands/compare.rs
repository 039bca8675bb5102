//! `twinbuild compare` — Diff two existing images and evaluate them.

use clap::Args;
use twinbuild_common::config::HarnessConfig;
use twinbuild_common::types::ImageRef;
use twinbuild_harness::engine::Engine;

use crate::output;

/// Arguments for the `compare` command.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First image (A), e.g. `test/hello:dockerapi`.
    pub image_a: String,

    /// Second image (B), e.g. `test/hello:ocexdockerbuild`.
    pub image_b: String,

    /// Print the verdict as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `compare` command.
///
/// # Errors
///
/// Returns an error if the diff tool fails, its report is malformed,
/// or the images are not equivalent.
pub fn execute(args: CompareArgs, config: HarnessConfig) -> anyhow::Result<()> {
    let image_a = ImageRef::new(args.image_a);
    let image_b = ImageRef::new(args.image_b);

    let engine = Engine::from_config(config)?;
    let verdict = engine.compare(&image_a, &image_b)?;
    output::print_verdict(&verdict, args.json)?;

    if !verdict.equivalent {
        anyhow::bail!("images {image_a} and {image_b} are not equivalent");
    }
    Ok(())
}
