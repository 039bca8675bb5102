//! `twinbuild run` — Build, compare and run every test case.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, ValueEnum};
use twinbuild_common::config::{HarnessConfig, RunTargets};
use twinbuild_harness::discovery::select_cases;
use twinbuild_harness::engine::Engine;

use crate::output;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory containing one build context per test case.
    #[arg(long)]
    pub tests_dir: Option<PathBuf>,

    /// Run only the named case (repeatable).
    #[arg(long)]
    pub only: Vec<String>,

    /// Which images to smoke-run after a successful comparison.
    #[arg(long, value_enum)]
    pub run_targets: Option<RunTargetsArg>,

    /// Write the suite report as JSON to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// CLI spelling of [`RunTargets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunTargetsArg {
    /// Run both images.
    Both,
    /// Run only the candidate image.
    Candidate,
    /// Skip the smoke run.
    None,
}

impl From<RunTargetsArg> for RunTargets {
    fn from(value: RunTargetsArg) -> Self {
        match value {
            RunTargetsArg::Both => Self::Both,
            RunTargetsArg::Candidate => Self::Candidate,
            RunTargetsArg::None => Self::None,
        }
    }
}

/// Executes the `run` command.
///
/// Ctrl+C stops the suite after the current case finishes.
///
/// # Errors
///
/// Returns an error if discovery fails, the report cannot be written,
/// the run was interrupted, or any case failed.
pub fn execute(args: RunArgs, config: HarnessConfig) -> anyhow::Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    run_until(args, config, &stop)
}

fn run_until(args: RunArgs, mut config: HarnessConfig, stop: &AtomicBool) -> anyhow::Result<()> {
    if let Some(dir) = args.tests_dir {
        config.tests_dir = dir;
    }
    if let Some(targets) = args.run_targets {
        config.run_targets = targets.into();
    }

    let engine = Engine::from_config(config)?;
    let cases = select_cases(engine.discover()?, &args.only)?;
    if cases.is_empty() {
        anyhow::bail!(
            "no test cases found in {}",
            engine.config().tests_dir.display()
        );
    }

    let report = engine.run_suite(&cases, stop);
    output::print_summary(&report);

    if let Some(path) = args.report {
        report.write_json(&path)?;
        tracing::info!(path = %path.display(), "wrote suite report");
    }

    if report.interrupted {
        anyhow::bail!(
            "run interrupted after {} of {} case(s)",
            report.results.len(),
            cases.len()
        );
    }
    let failed = report.failed_cases();
    if !failed.is_empty() {
        anyhow::bail!("failed cases: {failed:?}");
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;

    use twinbuild_common::config::CommandSpec;

    use super::*;

    const BUILD_SCRIPT: &str = r#"test -f "$1/Dockerfile""#;
    const DIFF_SCRIPT: &str =
        r#"printf '{"files_differ": [], "%s": {"unique_files": []}, "%s": {"unique_files": []}}' "$1" "$2""#;

    fn sh_config() -> HarnessConfig {
        HarnessConfig {
            reference: CommandSpec::new("sh", &["-c", BUILD_SCRIPT, "sh", "{context}", "{image}"]),
            candidate: CommandSpec::new("sh", &["-c", BUILD_SCRIPT, "sh", "{context}", "{image}"]),
            diff: CommandSpec::new("sh", &["-c", DIFF_SCRIPT, "sh", "{image_a}", "{image_b}"]),
            run: CommandSpec::new("sh", &["-c", "true", "sh", "{image}"]),
            ..HarnessConfig::default()
        }
    }

    fn add_case(tests_dir: &Path, name: &str, dockerfile: bool) {
        let dir = tests_dir.join(name);
        std::fs::create_dir_all(&dir).expect("mkdir");
        if dockerfile {
            std::fs::write(dir.join("Dockerfile"), "FROM scratch\n").expect("write Dockerfile");
        }
    }

    fn args(tests_dir: &Path, report: Option<PathBuf>) -> RunArgs {
        RunArgs {
            tests_dir: Some(tests_dir.to_path_buf()),
            only: Vec::new(),
            run_targets: None,
            report,
        }
    }

    #[test]
    fn execute_fails_listing_failed_cases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tests = dir.path().join("cases");
        add_case(&tests, "broken", false);
        add_case(&tests, "hello", true);
        let report = dir.path().join("report.json");

        let err = execute(args(&tests, Some(report.clone())), sh_config()).unwrap_err();
        assert_eq!(err.to_string(), r#"failed cases: ["broken"]"#);
        assert!(report.exists(), "report is written before failing");
    }

    #[test]
    fn run_passes_when_every_case_passes() {
        let dir = tempfile::tempdir().expect("tempdir");
        add_case(dir.path(), "hello", true);

        run_until(args(dir.path(), None), sh_config(), &AtomicBool::new(false)).expect("run");
    }

    #[test]
    fn run_fails_when_interrupted() {
        let dir = tempfile::tempdir().expect("tempdir");
        add_case(dir.path(), "hello", true);

        let err = run_until(args(dir.path(), None), sh_config(), &AtomicBool::new(true)).unwrap_err();
        assert!(err.to_string().contains("interrupted"), "got: {err}");
    }

    #[test]
    fn run_fails_on_empty_tests_dir() {
        let dir = tempfile::tempdir().expect("tempdir");

        let err = run_until(args(dir.path(), None), sh_config(), &AtomicBool::new(false)).unwrap_err();
        assert!(err.to_string().contains("no test cases"), "got: {err}");
    }
}
