//! Harness engine that drives each test case through the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use twinbuild_common::config::{HarnessConfig, RunTargets};
use twinbuild_common::error::Result;
use twinbuild_common::types::{BuildSide, ImageRef};
use twinbuild_diff::{Verdict, evaluate};

use crate::builder::{BuildPair, CommandBuilder, ImageBuilder};
use crate::container::{CommandContainerRunner, ContainerRunner};
use crate::difftool::{CommandDiffTool, DiffTool};
use crate::discovery::{self, TestCase};
use crate::report::{CaseOutcome, CaseResult, Stage, SuiteReport};

/// Coordinates builders, the diff tool and the container runner.
///
/// Cases run one at a time. A failing case is recorded and the engine
/// moves on to the next one.
pub struct Engine {
    config: HarnessConfig,
    reference: Box<dyn ImageBuilder>,
    candidate: Box<dyn ImageBuilder>,
    diff_tool: Box<dyn DiffTool>,
    runner: Box<dyn ContainerRunner>,
}

impl Engine {
    /// Creates an engine whose tools are the commands named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reference: Box::new(CommandBuilder::reference(&config)),
            candidate: Box::new(CommandBuilder::candidate(&config)),
            diff_tool: Box::new(CommandDiffTool::new(config.diff.clone())),
            runner: Box::new(CommandContainerRunner::new(config.run.clone())),
            config,
        })
    }

    /// Creates an engine from explicit parts.
    #[must_use]
    pub fn with_parts(
        config: HarnessConfig,
        reference: Box<dyn ImageBuilder>,
        candidate: Box<dyn ImageBuilder>,
        diff_tool: Box<dyn DiffTool>,
        runner: Box<dyn ContainerRunner>,
    ) -> Self {
        Self {
            config,
            reference,
            candidate,
            diff_tool,
            runner,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Lists the cases under the configured tests directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or unreadable.
    pub fn discover(&self) -> Result<Vec<TestCase>> {
        discovery::discover_cases(&self.config.tests_dir)
    }

    /// Diffs two existing images and evaluates their equivalence.
    ///
    /// # Errors
    ///
    /// Returns an error if the diff tool fails or reports malformed output.
    /// Non-equivalence is reported through the returned [`Verdict`].
    pub fn compare(&self, image_a: &ImageRef, image_b: &ImageRef) -> Result<Verdict> {
        let diff = self.diff_tool.diff(image_a, image_b)?;
        Ok(evaluate(&diff))
    }

    /// Builds, compares and runs a single case.
    pub fn run_case(&self, case: &TestCase) -> CaseResult {
        let started = Instant::now();
        let images = BuildPair::for_case(&self.config, case);
        tracing::info!(case = %case.name, "running test case");

        let outcome = match self.pipeline(case, &images) {
            Ok(()) => {
                tracing::info!(case = %case.name, "images are identical");
                CaseOutcome::Passed
            }
            Err(failed) => {
                tracing::error!(case = %case.name, outcome = ?failed, "test case failed");
                failed
            }
        };

        CaseResult {
            case: case.name.clone(),
            images,
            outcome,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Runs `cases` in order, stopping early once `stop` is set.
    pub fn run_suite(&self, cases: &[TestCase], stop: &AtomicBool) -> SuiteReport {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(cases.len());
        let mut interrupted = false;

        for case in cases {
            if stop.load(Ordering::SeqCst) {
                tracing::warn!(remaining = cases.len() - results.len(), "run interrupted");
                interrupted = true;
                break;
            }
            results.push(self.run_case(case));
        }

        let report = SuiteReport {
            started_at,
            finished_at: Utc::now(),
            interrupted,
            results,
        };
        tracing::info!(
            passed = report.passed(),
            failed = report.failed_cases().len(),
            interrupted,
            "suite finished"
        );
        report
    }

    fn pipeline(&self, case: &TestCase, images: &BuildPair) -> std::result::Result<(), CaseOutcome> {
        for builder in [&self.reference, &self.candidate] {
            let side = builder.side();
            builder
                .build(&case.context_dir, images.get(side))
                .map_err(|e| failed(Stage::Build(side), e.to_string(), Vec::new()))?;
        }

        let verdict = self
            .compare(&images.reference, &images.candidate)
            .map_err(|e| failed(Stage::Diff, e.to_string(), Vec::new()))?;
        if !verdict.equivalent {
            return Err(failed(
                Stage::Equivalence,
                format!("{} violation(s)", verdict.violations.len()),
                verdict.messages(),
            ));
        }
        tracing::info!(case = %case.name, "structural diff passed");

        for side in run_sides(self.config.run_targets) {
            self.runner
                .run(images.get(*side))
                .map_err(|e| failed(Stage::Run(*side), e.to_string(), Vec::new()))?;
        }
        Ok(())
    }
}

const fn run_sides(targets: RunTargets) -> &'static [BuildSide] {
    match targets {
        RunTargets::Both => &[BuildSide::Reference, BuildSide::Candidate],
        RunTargets::Candidate => &[BuildSide::Candidate],
        RunTargets::None => &[],
    }
}

const fn failed(stage: Stage, reason: String, details: Vec<String>) -> CaseOutcome {
    CaseOutcome::Failed {
        stage,
        reason,
        details,
    }
}
