//! Harness configuration model.
//!
//! Every external tool the harness drives is described by a [`CommandSpec`]:
//! a program plus an argument template with `{placeholder}` slots. All
//! fields have defaults, so a config file only needs the values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    CANDIDATE_TAG, CONTEXT_PLACEHOLDER, DEFAULT_IMAGE_REPO, DEFAULT_TESTS_DIR, IMAGE_A_PLACEHOLDER,
    IMAGE_B_PLACEHOLDER, IMAGE_PLACEHOLDER, REFERENCE_TAG,
};
use crate::error::{Result, TwinbuildError};

/// A program invocation with placeholder-bearing arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,
    /// Argument template.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command spec from a program and argument template.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Substitutes every `(placeholder, value)` pair into the arguments.
    ///
    /// Placeholders may appear inside a larger argument (`--tag={image}`).
    /// Each argument is scanned once, so substituted values are never
    /// rescanned for placeholders.
    #[must_use]
    pub fn render(&self, substitutions: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| substitute(arg, substitutions))
            .collect()
    }

    fn require(&self, name: &str, placeholders: &[&str]) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(TwinbuildError::Config {
                message: format!("{name}: program must not be empty"),
            });
        }
        for slot in placeholders {
            if !self.args.iter().any(|a| a.contains(slot)) {
                return Err(TwinbuildError::Config {
                    message: format!("{name}: arguments must contain {slot}"),
                });
            }
        }
        Ok(())
    }
}

fn substitute(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((at, slot, value)) = substitutions
        .iter()
        .filter(|(slot, _)| !slot.is_empty())
        .filter_map(|&(slot, value)| rest.find(slot).map(|at| (at, slot, value)))
        .min_by_key(|&(at, slot, _)| (at, std::cmp::Reverse(slot.len())))
    {
        rendered.push_str(&rest[..at]);
        rendered.push_str(value);
        rest = &rest[at + slot.len()..];
    }
    rendered.push_str(rest);
    rendered
}

/// Which built images get a smoke run after the comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTargets {
    /// Run both the reference and the candidate image.
    #[default]
    Both,
    /// Run only the candidate image.
    Candidate,
    /// Skip the smoke run.
    None,
}

/// Root configuration for a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory whose subdirectories are build contexts.
    pub tests_dir: PathBuf,
    /// Repository prefix for built images.
    pub image_repo: String,
    /// Tag given to reference images.
    pub reference_tag: String,
    /// Tag given to candidate images.
    pub candidate_tag: String,
    /// Reference builder; needs `{context}` and `{image}`.
    pub reference: CommandSpec,
    /// Candidate builder; needs `{context}` and `{image}`.
    pub candidate: CommandSpec,
    /// Structural diff tool; needs `{image_a}` and `{image_b}`, prints JSON.
    pub diff: CommandSpec,
    /// Smoke-run command; needs `{image}`.
    pub run: CommandSpec,
    /// Images to smoke-run.
    pub run_targets: RunTargets,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from(DEFAULT_TESTS_DIR),
            image_repo: DEFAULT_IMAGE_REPO.to_string(),
            reference_tag: REFERENCE_TAG.to_string(),
            candidate_tag: CANDIDATE_TAG.to_string(),
            reference: CommandSpec::new("docker", &["build", "-t", IMAGE_PLACEHOLDER, CONTEXT_PLACEHOLDER]),
            candidate: CommandSpec::new(
                "oc",
                &["ex", "dockerbuild", CONTEXT_PLACEHOLDER, IMAGE_PLACEHOLDER],
            ),
            diff: CommandSpec::new(
                "atomic",
                &["diff", "--json", IMAGE_A_PLACEHOLDER, IMAGE_B_PLACEHOLDER],
            ),
            run: CommandSpec::new("docker", &["run", "--rm", "-i", IMAGE_PLACEHOLDER]),
            run_targets: RunTargets::Both,
        }
    }
}

impl HarnessConfig {
    /// Loads a configuration from a JSON file, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON,
    /// or fails [`HarnessConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading harness config");
        let content = std::fs::read_to_string(path).map_err(|e| TwinbuildError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every command template carries the slots it needs.
    ///
    /// # Errors
    ///
    /// Returns `TwinbuildError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.reference
            .require("reference", &[CONTEXT_PLACEHOLDER, IMAGE_PLACEHOLDER])?;
        self.candidate
            .require("candidate", &[CONTEXT_PLACEHOLDER, IMAGE_PLACEHOLDER])?;
        self.diff
            .require("diff", &[IMAGE_A_PLACEHOLDER, IMAGE_B_PLACEHOLDER])?;
        self.run.require("run", &[IMAGE_PLACEHOLDER])?;
        if self.reference_tag == self.candidate_tag {
            return Err(TwinbuildError::Config {
                message: format!(
                    "reference and candidate tags must differ (both are \"{}\")",
                    self.reference_tag
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
    }

    #[test]
    fn render_substitutes_inside_arguments() {
        let spec = CommandSpec::new("docker", &["build", "--tag={image}", "{context}"]);
        let args = spec.render(&[("{image}", "test/a:x"), ("{context}", "/ctx")]);
        assert_eq!(args, vec!["build", "--tag=test/a:x", "/ctx"]);
    }

    #[test]
    fn render_does_not_rescan_substituted_values() {
        let spec = CommandSpec::new("docker", &["build", "-t", "{image}", "{context}"]);
        let args = spec.render(&[("{context}", "/cases/{image}"), ("{image}", "test/a:x")]);
        assert_eq!(args, vec!["build", "-t", "test/a:x", "/cases/{image}"]);

        let args = spec.render(&[("{image}", "test/{context}:x"), ("{context}", "/ctx")]);
        assert_eq!(args, vec!["build", "-t", "test/{context}:x", "/ctx"]);
    }

    #[test]
    fn render_handles_repeated_and_adjacent_slots() {
        let spec = CommandSpec::new("diff", &["{image_a}..{image_b}", "{image_a}{image_a}"]);
        let args = spec.render(&[("{image_a}", "a"), ("{image_b}", "b")]);
        assert_eq!(args, vec!["a..b", "aa"]);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("twinbuild.json");
        std::fs::write(&path, r#"{ "tests_dir": "/srv/cases", "run_targets": "candidate" }"#)
            .expect("write config");

        let config = HarnessConfig::load(&path).expect("load");
        assert_eq!(config.tests_dir, PathBuf::from("/srv/cases"));
        assert_eq!(config.run_targets, RunTargets::Candidate);
        assert_eq!(config.reference.program, "docker");
        assert_eq!(config.candidate_tag, "ocexdockerbuild");
    }

    #[test]
    fn load_missing_file_returns_io_error() {
        let err = HarnessConfig::load(Path::new("/nonexistent/twinbuild.json")).unwrap_err();
        assert!(matches!(err, TwinbuildError::Io { .. }));
    }

    #[test]
    fn validate_rejects_builder_without_image_slot() {
        let config = HarnessConfig {
            candidate: CommandSpec::new("buildah", &["bud", "{context}"]),
            ..HarnessConfig::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("candidate"), "got: {msg}");
        assert!(msg.contains("{image}"), "got: {msg}");
    }

    #[test]
    fn validate_rejects_identical_tags() {
        let config = HarnessConfig {
            candidate_tag: "dockerapi".into(),
            ..HarnessConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
