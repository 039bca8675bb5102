//! Child process invocation for the external tools the harness drives.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use twinbuild_common::error::{Result, TwinbuildError};

/// Resolves a program name against `PATH` (paths are checked as given).
///
/// # Errors
///
/// Returns `TwinbuildError::NotFound` if no executable is found.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| TwinbuildError::NotFound {
        kind: "program",
        id: program.to_string(),
    })
}

/// Runs a program with inherited stdio and waits for it to exit.
///
/// Builder and container output streams straight to the terminal, and the
/// child reads the harness's own stdin, so `docker run -i -t` gets the TTY.
///
/// # Errors
///
/// Returns an error if the program cannot be found or spawned, or
/// `TwinbuildError::CommandFailed` if it exits unsuccessfully.
pub fn run_status(program: &str, args: &[String]) -> Result<()> {
    run_status_with_stdin(program, args, Stdio::inherit())
}

fn run_status_with_stdin(program: &str, args: &[String], stdin: Stdio) -> Result<()> {
    let path = resolve_program(program)?;
    tracing::debug!(program, args = ?args, "spawning");

    let status = Command::new(&path)
        .args(args)
        .stdin(stdin)
        .status()
        .map_err(|e| TwinbuildError::Io { path, source: e })?;

    if status.success() {
        Ok(())
    } else {
        Err(TwinbuildError::CommandFailed {
            program: program.to_string(),
            code: status.code(),
            stderr: String::new(),
        })
    }
}

/// Runs a program and returns its standard output.
///
/// # Errors
///
/// Returns an error if the program cannot be found or spawned, or
/// `TwinbuildError::CommandFailed` (carrying stderr) if it exits
/// unsuccessfully.
pub fn run_capture(program: &str, args: &[String]) -> Result<String> {
    let path = resolve_program(program)?;
    tracing::debug!(program, args = ?args, "spawning for output");

    let output = Command::new(&path)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| TwinbuildError::Io { path, source: e })?;

    if !output.status.success() {
        return Err(TwinbuildError::CommandFailed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
