//! Image builders.

use std::path::Path;

use serde::{Deserialize, Serialize};
use twinbuild_common::config::{CommandSpec, HarnessConfig};
use twinbuild_common::constants::{CONTEXT_PLACEHOLDER, IMAGE_PLACEHOLDER};
use twinbuild_common::error::Result;
use twinbuild_common::types::{BuildSide, ImageRef};

use crate::discovery::TestCase;
use crate::process;

/// The two images built from one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPair {
    /// Image built by the reference builder (image A).
    pub reference: ImageRef,
    /// Image built by the candidate builder (image B).
    pub candidate: ImageRef,
}

impl BuildPair {
    /// Names both images for `case` using the configured repo and tags.
    #[must_use]
    pub fn for_case(config: &HarnessConfig, case: &TestCase) -> Self {
        Self {
            reference: ImageRef::for_case(&config.image_repo, &case.name, &config.reference_tag),
            candidate: ImageRef::for_case(&config.image_repo, &case.name, &config.candidate_tag),
        }
    }

    /// Returns the image built on `side`.
    #[must_use]
    pub const fn get(&self, side: BuildSide) -> &ImageRef {
        match side {
            BuildSide::Reference => &self.reference,
            BuildSide::Candidate => &self.candidate,
        }
    }
}

/// Something that turns a build context into a tagged image.
pub trait ImageBuilder: Send + Sync {
    /// Which side of the comparison this builder produces.
    fn side(&self) -> BuildSide;

    /// Builds `context` and tags the result as `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the build cannot be started or fails.
    fn build(&self, context: &Path, image: &ImageRef) -> Result<()>;
}

/// Builder backed by an external command such as `docker build`.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    side: BuildSide,
    spec: CommandSpec,
}

impl CommandBuilder {
    /// Creates a builder from a command template.
    #[must_use]
    pub const fn new(side: BuildSide, spec: CommandSpec) -> Self {
        Self { side, spec }
    }

    /// The configured reference builder.
    #[must_use]
    pub fn reference(config: &HarnessConfig) -> Self {
        Self::new(BuildSide::Reference, config.reference.clone())
    }

    /// The configured candidate builder.
    #[must_use]
    pub fn candidate(config: &HarnessConfig) -> Self {
        Self::new(BuildSide::Candidate, config.candidate.clone())
    }

    /// Arguments for building `context` as `image`.
    #[must_use]
    pub fn args(&self, context: &Path, image: &ImageRef) -> Vec<String> {
        let context = context.display().to_string();
        self.spec.render(&[
            (CONTEXT_PLACEHOLDER, context.as_str()),
            (IMAGE_PLACEHOLDER, image.as_str()),
        ])
    }
}

impl ImageBuilder for CommandBuilder {
    fn side(&self) -> BuildSide {
        self.side
    }

    fn build(&self, context: &Path, image: &ImageRef) -> Result<()> {
        tracing::info!(
            side = %self.side,
            program = %self.spec.program,
            context = %context.display(),
            image = %image,
            "building image"
        );
        process::run_status(&self.spec.program, &self.args(context, image))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn case(name: &str) -> TestCase {
        TestCase {
            name: name.into(),
            context_dir: PathBuf::from("/srv/tests").join(name),
        }
    }

    #[test]
    fn build_pair_uses_repo_and_tags() {
        let pair = BuildPair::for_case(&HarnessConfig::default(), &case("hello"));
        assert_eq!(pair.reference.as_str(), "test/hello:dockerapi");
        assert_eq!(pair.candidate.as_str(), "test/hello:ocexdockerbuild");
        assert_eq!(pair.get(BuildSide::Candidate), &pair.candidate);
    }

    #[test]
    fn reference_builder_renders_docker_build() {
        let builder = CommandBuilder::reference(&HarnessConfig::default());
        let args = builder.args(Path::new("/srv/tests/hello"), &ImageRef::new("test/hello:dockerapi"));
        assert_eq!(args, vec!["build", "-t", "test/hello:dockerapi", "/srv/tests/hello"]);
        assert_eq!(builder.side(), BuildSide::Reference);
    }

    #[test]
    fn candidate_builder_renders_context_before_image() {
        let builder = CommandBuilder::candidate(&HarnessConfig::default());
        let args = builder.args(
            Path::new("/srv/tests/hello"),
            &ImageRef::new("test/hello:ocexdockerbuild"),
        );
        assert_eq!(
            args,
            vec!["ex", "dockerbuild", "/srv/tests/hello", "test/hello:ocexdockerbuild"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn command_builder_failure_is_error() {
        let builder = CommandBuilder::new(
            BuildSide::Candidate,
            CommandSpec::new("sh", &["-c", "exit 1", "sh", "{context}", "{image}"]),
        );
        assert!(builder.build(Path::new("/tmp"), &ImageRef::new("x:y")).is_err());
    }
}
