//! Smoke-running built images.

use twinbuild_common::config::CommandSpec;
use twinbuild_common::constants::IMAGE_PLACEHOLDER;
use twinbuild_common::error::Result;
use twinbuild_common::types::ImageRef;

use crate::process;

/// Starts a container from an image and waits for its default command.
pub trait ContainerRunner: Send + Sync {
    /// Runs `image`; success means the container exited with status 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot start or exits non-zero.
    fn run(&self, image: &ImageRef) -> Result<()>;
}

/// Runner backed by an external command such as `docker run --rm -i`.
#[derive(Debug, Clone)]
pub struct CommandContainerRunner {
    spec: CommandSpec,
}

impl CommandContainerRunner {
    /// Creates the runner from a command template.
    #[must_use]
    pub const fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl ContainerRunner for CommandContainerRunner {
    fn run(&self, image: &ImageRef) -> Result<()> {
        tracing::info!(image = %image, "starting a container");
        let args = self.spec.render(&[(IMAGE_PLACEHOLDER, image.as_str())]);
        process::run_status(&self.spec.program, &args)?;
        tracing::info!(image = %image, "test command passed");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_passes_image_to_command() {
        let runner = CommandContainerRunner::new(CommandSpec::new(
            "sh",
            &["-c", r#"test "$1" = "test/x:dockerapi""#, "sh", "{image}"],
        ));
        assert!(runner.run(&ImageRef::new("test/x:dockerapi")).is_ok());
        assert!(runner.run(&ImageRef::new("test/y:dockerapi")).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn run_gives_container_the_harness_stdin() {
        let runner = CommandContainerRunner::new(CommandSpec::new(
            "sh",
            &[
                "-c",
                r#"test "$(readlink /proc/self/fd/0)" = "$(readlink /proc/$PPID/fd/0)""#,
                "sh",
                "{image}",
            ],
        ));
        assert!(runner.run(&ImageRef::new("test/x:dockerapi")).is_ok());
    }
}
