#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # mvnpack
//!
//! Runs `mvn clean package` in a project directory and reports the JAR files
//! it produced. When Maven is unavailable, JAR files left by an earlier build
//! are reported instead.

use std::path::PathBuf;

use anyhow::Result;
use bpaf::*;
use dotenvy::dotenv;
use mvnpack::{BuildRunner, LogContext, RunnerConfig, SystemLauncher, report};

/// Parse the command line arguments and return the project directory, if
/// one was given.
fn options() -> Option<PathBuf> {
    positional::<PathBuf>("PROJECT_DIR")
        .help("Maven project to package, defaults to the current directory")
        .optional()
        .to_options()
        .descr("Package a Maven project into JAR files")
        .footer(
            "Exit codes:\n  0  Maven packaged the project\n  1  Maven is unavailable or the \
             build failed\n  2  Maven is unavailable, but existing JAR files were found\n\nA log \
             of each run is written to logs/package_<timestamp>.log in the current directory.",
        )
        .version(env!("CARGO_PKG_VERSION"))
        .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let project_dir = options();

    let log = LogContext::in_working_dir()?;
    let log_path = log.path().to_path_buf();
    let runner = BuildRunner::new(RunnerConfig::default(), SystemLauncher, log);

    let outcome = runner.run(project_dir.as_deref()).await;
    report::print(&outcome, &log_path);

    // Flush the log file before exiting.
    drop(runner);
    std::process::exit(outcome.exit_code())
}
