//! `twinbuild list` — List discovered test cases.

use std::path::PathBuf;

use clap::Args;
use twinbuild_common::config::HarnessConfig;
use twinbuild_harness::builder::BuildPair;
use twinbuild_harness::discovery::discover_cases;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory containing one build context per test case.
    #[arg(long)]
    pub tests_dir: Option<PathBuf>,

    /// Also print the image names each case builds.
    #[arg(short, long)]
    pub images: bool,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if the tests directory cannot be read.
pub fn execute(args: ListArgs, mut config: HarnessConfig) -> anyhow::Result<()> {
    if let Some(dir) = args.tests_dir {
        config.tests_dir = dir;
    }
    let cases = discover_cases(&config.tests_dir)?;
    if cases.is_empty() {
        println!("No test cases found.");
        return Ok(());
    }

    for case in &cases {
        if args.images {
            let pair = BuildPair::for_case(&config, case);
            println!("{:<24} {:<40} {}", case.name, pair.reference, pair.candidate);
        } else {
            println!("{}", case.name);
        }
    }
    Ok(())
}
