//! Per-case results and the suite report.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use twinbuild_common::error::{Result, TwinbuildError};
use twinbuild_common::types::BuildSide;

use crate::builder::BuildPair;

/// Pipeline step at which a case failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "side", rename_all = "snake_case")]
pub enum Stage {
    /// Building one of the two images.
    Build(BuildSide),
    /// Producing or parsing the structural diff.
    Diff,
    /// The images are not equivalent.
    Equivalence,
    /// Smoke-running one of the images.
    Run(BuildSide),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(side) => write!(f, "build ({side})"),
            Self::Diff => write!(f, "diff"),
            Self::Equivalence => write!(f, "equivalence"),
            Self::Run(side) => write!(f, "run ({side})"),
        }
    }
}

/// How a single case ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Both builds succeeded, the images are equivalent and runnable.
    Passed,
    /// The case stopped at `stage`.
    Failed {
        /// Failing step.
        stage: Stage,
        /// One-line summary.
        reason: String,
        /// Violation messages when `stage` is `Equivalence`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        details: Vec<String>,
    },
}

impl CaseOutcome {
    /// True for [`CaseOutcome::Passed`].
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Result of running one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case name.
    pub case: String,
    /// Images built (or attempted) for the case.
    pub images: BuildPair,
    /// Outcome.
    pub outcome: CaseOutcome,
    /// Wall-clock time spent on the case.
    pub duration_ms: u64,
}

/// Results of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Whether the run was stopped before every case ran.
    pub interrupted: bool,
    /// Case results in execution order.
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    /// Names of failed cases in execution order.
    #[must_use]
    pub fn failed_cases(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.outcome.is_passed())
            .map(|r| r.case.as_str())
            .collect()
    }

    /// True when every case ran and passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.failed_cases().is_empty()
    }

    /// Writes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| TwinbuildError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use twinbuild_common::types::ImageRef;

    use super::*;

    fn result(case: &str, outcome: CaseOutcome) -> CaseResult {
        CaseResult {
            case: case.into(),
            images: BuildPair {
                reference: ImageRef::new(format!("test/{case}:dockerapi")),
                candidate: ImageRef::new(format!("test/{case}:ocexdockerbuild")),
            },
            outcome,
            duration_ms: 10,
        }
    }

    fn report(results: Vec<CaseResult>) -> SuiteReport {
        let now = Utc::now();
        SuiteReport {
            started_at: now,
            finished_at: now,
            interrupted: false,
            results,
        }
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Build(BuildSide::Candidate).to_string(), "build (candidate)");
        assert_eq!(Stage::Equivalence.to_string(), "equivalence");
    }

    #[test]
    fn failed_cases_lists_only_failures() {
        let report = report(vec![
            result("a", CaseOutcome::Passed),
            result(
                "b",
                CaseOutcome::Failed {
                    stage: Stage::Diff,
                    reason: "boom".into(),
                    details: Vec::new(),
                },
            ),
        ]);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed_cases(), vec!["b"]);
        assert!(!report.is_success());
    }

    #[test]
    fn interrupted_run_is_not_success() {
        let mut report = report(vec![result("a", CaseOutcome::Passed)]);
        assert!(report.is_success());
        report.interrupted = true;
        assert!(!report.is_success());
    }

    #[test]
    fn write_json_serializes_outcome_tags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.json");
        let report = report(vec![result(
            "b",
            CaseOutcome::Failed {
                stage: Stage::Run(BuildSide::Reference),
                reason: "exit 1".into(),
                details: Vec::new(),
            },
        )]);
        report.write_json(&path).expect("write");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        let outcome = &value["results"][0]["outcome"];
        assert_eq!(outcome["status"], "failed");
        assert_eq!(outcome["stage"]["stage"], "run");
        assert_eq!(outcome["stage"]["side"], "reference");
        assert!(outcome.get("details").is_none());
    }
}
