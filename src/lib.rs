//! # mvnpack
//!
//! Packages a Maven project into JAR files by running `mvn clean package`,
//! and falls back to reporting JARs from an earlier build when Maven cannot
//! be run.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Scanning the build output directory for packaged artifacts
pub mod artifacts;
/// Run configuration and its platform defaults
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Error taxonomy and exit codes
pub mod error;
/// Per-run log file
pub mod logging;
/// Spawning subprocesses and collecting their output
pub mod process;
/// Terminal output
pub mod report;
/// The build runner itself
pub mod runner;
/// Locating and launching Maven
pub mod tool;

pub use config::{ArtifactFilter, RunnerConfig};
pub use error::{LaunchError, RunError};
pub use logging::LogContext;
pub use runner::{BuildRunner, Outcome};
pub use tool::{InvocationResult, Launcher, Strategy, SystemLauncher, ToolCommand};
