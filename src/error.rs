#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{EXIT_FAILURE, EXIT_INTERRUPTED};

/// Reasons a packaging run did not produce a fresh build.
#[derive(Debug, Error)]
pub enum RunError {
    /// The project directory does not exist.
    #[error("project directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),
    /// The project directory has no build descriptor.
    #[error("no {descriptor} found in '{}', make sure this is a Maven project", dir.display())]
    DescriptorMissing {
        /// Directory that was inspected.
        dir:        PathBuf,
        /// Descriptor file name that was expected.
        descriptor: String,
    },
    /// Maven could not be run and no earlier artifacts exist.
    #[error("Maven was not found, make sure it is installed and on PATH")]
    ToolUnavailable,
    /// Maven ran and exited unsuccessfully.
    #[error("build failed, Maven exited with code {code}")]
    BuildFailed {
        /// Exit code reported by Maven.
        code:    i32,
        /// Trailing lines of Maven's stderr.
        excerpt: Vec<String>,
    },
    /// Access to the project, its output, or the tool was denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The operator cancelled the run.
    #[error("packaging was interrupted by the user")]
    Interrupted,
    /// Anything else.
    #[error("unexpected error while packaging: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl RunError {
    /// Process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::BuildFailed { code, .. } => *code,
            RunError::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

/// Ways launching an external process can fail before it produces a result.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The executable could not be found at launch time.
    #[error("executable not found: {0}")]
    NotFound(String),
    /// The executable exists but may not be run.
    #[error("not permitted to run {0}")]
    PermissionDenied(String),
    /// The operator cancelled while the process was running.
    #[error("interrupted")]
    Interrupted,
    /// Any other spawn or I/O failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<LaunchError> for RunError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::NotFound(_) => RunError::ToolUnavailable,
            LaunchError::PermissionDenied(what) => RunError::PermissionDenied(what),
            LaunchError::Interrupted => RunError::Interrupted,
            LaunchError::Other(e) => RunError::Unexpected(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(RunError::ToolUnavailable.exit_code(), 1);
        assert_eq!(RunError::DirectoryNotFound(PathBuf::from("x")).exit_code(), 1);
        assert_eq!(
            RunError::BuildFailed {
                code:    42,
                excerpt: vec![],
            }
            .exit_code(),
            42
        );
        assert_eq!(RunError::Interrupted.exit_code(), EXIT_INTERRUPTED);
        assert_eq!(RunError::from(anyhow::anyhow!("boom")).exit_code(), 1);
    }
}
