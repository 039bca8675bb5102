//! `twinbuild evaluate` — Evaluate a saved diff report.

use std::path::{Path, PathBuf};

use clap::Args;
use twinbuild_common::error::TwinbuildError;
use twinbuild_common::types::ImageRef;
use twinbuild_diff::{StructuralDiff, Verdict, evaluate};

use crate::output;

/// Arguments for the `evaluate` command.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// JSON report produced by the diff tool.
    #[arg(long)]
    pub report: PathBuf,

    /// Image A as keyed in the report.
    pub image_a: String,

    /// Image B as keyed in the report.
    pub image_b: String,

    /// Print the verdict as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `evaluate` command.
///
/// # Errors
///
/// Returns an error if the report is unreadable or malformed, or the
/// images are not equivalent.
pub fn execute(args: EvaluateArgs) -> anyhow::Result<()> {
    let image_a = ImageRef::new(args.image_a);
    let image_b = ImageRef::new(args.image_b);

    let verdict = evaluate_file(&args.report, &image_a, &image_b)?;
    output::print_verdict(&verdict, args.json)?;

    if !verdict.equivalent {
        anyhow::bail!("images {image_a} and {image_b} are not equivalent");
    }
    Ok(())
}

fn evaluate_file(path: &Path, image_a: &ImageRef, image_b: &ImageRef) -> anyhow::Result<Verdict> {
    let text = std::fs::read_to_string(path).map_err(|e| TwinbuildError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let diff = StructuralDiff::from_json_str(&text, image_a, image_b)?;
    Ok(evaluate(&diff))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_report(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("diff.json");
        std::fs::write(&path, body).expect("write report");
        path
    }

    #[test]
    fn evaluate_file_time_only_is_equivalent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_report(
            dir.path(),
            r#"{"files_differ": [{"name": "/etc/motd", "reasons": ["time"]}],
                "a:1": {"unique_files": []}, "b:1": {"unique_files": []}}"#,
        );
        let verdict =
            evaluate_file(&path, &ImageRef::new("a:1"), &ImageRef::new("b:1")).expect("evaluate");
        assert!(verdict.equivalent);
    }

    #[test]
    fn evaluate_file_missing_key_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_report(dir.path(), r#"{"a:1": {"unique_files": []}, "b:1": {"unique_files": []}}"#);
        let err = evaluate_file(&path, &ImageRef::new("a:1"), &ImageRef::new("b:1")).unwrap_err();
        assert!(err.to_string().contains("files_differ"), "got: {err}");
    }

    #[test]
    fn evaluate_missing_file_is_error() {
        let err = evaluate_file(
            Path::new("/nonexistent/diff.json"),
            &ImageRef::new("a"),
            &ImageRef::new("b"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/diff.json"), "got: {err}");
    }

    #[test]
    fn execute_fails_when_images_are_not_equivalent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_report(
            dir.path(),
            r#"{"files_differ": [], "a:1": {"unique_files": ["/tmp/leftover"]}, "b:1": {"unique_files": []}}"#,
        );
        let args = EvaluateArgs {
            report: path,
            image_a: "a:1".into(),
            image_b: "b:1".into(),
            json: false,
        };
        let err = execute(args).unwrap_err();
        assert!(err.to_string().contains("not equivalent"), "got: {err}");
    }

    #[test]
    fn execute_succeeds_when_images_are_equivalent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_report(
            dir.path(),
            r#"{"files_differ": [], "a:1": {"unique_files": []}, "b:1": {"unique_files": []}}"#,
        );
        let args = EvaluateArgs {
            report: path,
            image_a: "a:1".into(),
            image_b: "b:1".into(),
            json: true,
        };
        execute(args).expect("equivalent");
    }
}
