//! Unified error types for the twinbuild workspace.
//!
//! A negative equivalence verdict is not an error: it is reported as a value
//! by the evaluator. Errors here cover malformed input and failures of the
//! surrounding tooling.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum TwinbuildError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path (or program name) where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A structural diff report is missing required data or has the wrong shape.
    #[error("malformed diff report at `{field}`: {message}")]
    MalformedInput {
        /// JSON location of the offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// An external program exited unsuccessfully.
    #[error("`{program}` exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    CommandFailed {
        /// Program that was invoked.
        program: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error, possibly empty.
        stderr: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl TwinbuildError {
    /// Shorthand for a [`TwinbuildError::MalformedInput`].
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"))
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TwinbuildError>;
