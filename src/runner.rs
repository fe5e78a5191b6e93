#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
    pin::{Pin, pin},
    time::Duration,
};

use anyhow::Context;
use tracing::instrument::WithSubscriber;

use crate::{
    artifacts::{self, Artifact},
    config::RunnerConfig,
    constants::{EXIT_FAILURE, EXIT_FALLBACK, EXIT_SUCCESS},
    error::{LaunchError, RunError},
    logging::LogContext,
    report,
    tool::{self, InvocationResult, Launcher, Strategy, SystemLauncher, Tool, ToolCommand},
};

/// What a packaging run ended with.
#[derive(Debug)]
pub enum Outcome {
    /// Maven built the project.
    Built {
        /// Artifacts in the output directory after the build.
        artifacts: Vec<Artifact>,
        /// How long the build took.
        elapsed:   Duration,
        /// Strategy the successful invocation used.
        strategy:  Strategy,
    },
    /// Maven could not run, but an earlier build left artifacts behind.
    Fallback {
        /// The artifacts that were found.
        artifacts: Vec<Artifact>,
    },
    /// Nothing usable was produced.
    Failed(RunError),
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Built { .. } => EXIT_SUCCESS,
            Outcome::Fallback { .. } => EXIT_FALLBACK,
            Outcome::Failed(e) => e.exit_code(),
        }
    }

    /// Artifacts reported by this run, if any.
    pub fn artifacts(&self) -> &[Artifact] {
        match self {
            Outcome::Built { artifacts, .. } | Outcome::Fallback { artifacts } => artifacts,
            Outcome::Failed(_) => &[],
        }
    }

    /// The error, if the run failed.
    pub fn error(&self) -> Option<&RunError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Resolves once the operator presses Ctrl-C. Never resolves if the handler
/// cannot be installed.
pub async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Validates a Maven project, runs `mvn clean package` in it and reports
/// what came out.
pub struct BuildRunner<L = SystemLauncher> {
    /// Run configuration.
    config:   RunnerConfig,
    /// Starts the external tool.
    launcher: L,
    /// Where this run logs to.
    log:      LogContext,
}

impl<L: Launcher> BuildRunner<L> {
    /// Creates a runner that logs to `log`.
    pub fn new(config: RunnerConfig, launcher: L, log: LogContext) -> Self {
        Self {
            config,
            launcher,
            log,
        }
    }

    /// The log context for this runner.
    pub fn log(&self) -> &LogContext {
        &self.log
    }

    /// The launcher this runner starts Maven with.
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Packages `project_dir`, or the current directory if `None`, stopping
    /// early on Ctrl-C.
    pub async fn run(&self, project_dir: Option<&Path>) -> Outcome {
        self.run_until(project_dir, interrupt_signal()).await
    }

    /// Like [`BuildRunner::run`], treating completion of `cancel` as an
    /// operator interrupt while a tool invocation is in flight.
    pub async fn run_until<C>(&self, project_dir: Option<&Path>, cancel: C) -> Outcome
    where
        C: Future<Output = ()>,
    {
        let dispatch = self.log.dispatch().clone();
        async {
            match std::env::current_dir() {
                Ok(cwd) => tracing::info!("Working directory: {}", cwd.display()),
                Err(e) => tracing::warn!("Could not determine the working directory: {e}"),
            }
            match self.config.search_path() {
                Some(path) => tracing::info!("PATH: {}", path.to_string_lossy()),
                None => tracing::warn!("PATH is not set"),
            }

            let outcome = match self.package(project_dir, cancel).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    match &e {
                        RunError::Interrupted => tracing::info!("Packaging interrupted by user"),
                        RunError::Unexpected(inner) => tracing::error!("{e}\n{inner:?}"),
                        _ => tracing::error!("{e}"),
                    }
                    Outcome::Failed(e)
                }
            };
            tracing::info!("Finished with exit code {}", outcome.exit_code());
            outcome
        }
        .with_subscriber(dispatch)
        .await
    }

    /// The linear packaging routine: validate, probe, build, report.
    async fn package<C>(&self, project_dir: Option<&Path>, cancel: C) -> Result<Outcome, RunError>
    where
        C: Future<Output = ()>,
    {
        let project_dir = self.resolve_project_dir(project_dir)?;

        if !project_dir.is_dir() {
            return Err(RunError::DirectoryNotFound(project_dir));
        }
        if !project_dir.join(self.config.descriptor()).is_file() {
            return Err(RunError::DescriptorMissing {
                dir:        project_dir,
                descriptor: self.config.descriptor().to_string(),
            });
        }

        let mut cancel = pin!(cancel);
        let tool = tool::locate(&self.config, &project_dir);
        let command_line = ToolCommand::new(
            tool.name(),
            self.config.build_args(),
            None,
            Strategy::Direct,
        )
        .command_line();
        tracing::info!("Packaging project {} with `{command_line}`", project_dir.display());
        report::announce(&project_dir, &command_line);

        if !self.probe(&tool, &project_dir, &mut cancel).await? {
            tracing::error!("{}", RunError::ToolUnavailable);
            return self.fallback(&project_dir);
        }

        tracing::info!("Running the Maven build");
        let build_args = self.config.build_args();
        let (result, strategy) = match self
            .execute(&tool, build_args, &project_dir, Strategy::Direct, &mut cancel)
            .await
        {
            Ok(result) => (result, Strategy::Direct),
            Err(LaunchError::NotFound(what)) => {
                tracing::error!("Could not launch {what}, retrying through the shell");
                match self
                    .execute(&tool, build_args, &project_dir, Strategy::Shell, &mut cancel)
                    .await
                {
                    Ok(result) => (result, Strategy::Shell),
                    Err(LaunchError::Interrupted) => return Err(RunError::Interrupted),
                    Err(e) => {
                        tracing::error!("Shell retry failed as well: {e}");
                        return self.fallback(&project_dir);
                    }
                }
            }
            Err(e) => return Err(e.into()),
        };

        self.conclude(result, strategy, &project_dir)
    }

    /// Anchors the requested directory at the working directory.
    fn resolve_project_dir(&self, project_dir: Option<&Path>) -> Result<PathBuf, RunError> {
        let cwd = std::env::current_dir().context("Could not determine the working directory")?;
        Ok(match project_dir {
            Some(dir) => {
                tracing::info!("Using project directory {}", dir.display());
                cwd.join(dir)
            }
            None => {
                tracing::info!(
                    "No project directory given, using the working directory {}",
                    cwd.display()
                );
                cwd
            }
        })
    }

    /// Runs the tool once with the given strategy, racing it against
    /// `cancel`.
    async fn execute<C>(
        &self,
        tool: &Tool,
        args: &[String],
        cwd: &Path,
        strategy: Strategy,
        cancel: &mut Pin<&mut C>,
    ) -> Result<InvocationResult, LaunchError>
    where
        C: Future<Output = ()>,
    {
        // The shell resolves the bare name itself.
        let program = match strategy {
            Strategy::Direct => tool.program(),
            Strategy::Shell => tool.name().into(),
        };
        let command = ToolCommand::new(program, args, Some(cwd), strategy);
        match (strategy, tool.resolved()) {
            (Strategy::Direct, Some(path)) => tracing::debug!("Resolved Maven at {}", path.display()),
            (Strategy::Direct, None) => tracing::debug!("Maven not resolved, using the bare name"),
            (Strategy::Shell, _) => {}
        }
        tracing::info!("Executing `{}` ({strategy})", command.command_line());

        tokio::select! {
            biased;
            _ = cancel.as_mut() => Err(LaunchError::Interrupted),
            result = self.launcher.launch(&command) => result,
        }
    }

    /// Checks that the tool runs at all. Only an interrupt is an error here.
    async fn probe<C>(
        &self,
        tool: &Tool,
        cwd: &Path,
        cancel: &mut Pin<&mut C>,
    ) -> Result<bool, RunError>
    where
        C: Future<Output = ()>,
    {
        let args = self.config.version_args();
        for strategy in [Strategy::Direct, Strategy::Shell] {
            match self.execute(tool, args, cwd, strategy, cancel).await {
                Ok(result) if result.success() => {
                    if let Some(banner) = result.version_banner() {
                        tracing::info!("Maven version: {banner}");
                    }
                    tracing::info!("Maven is available");
                    return Ok(true);
                }
                Ok(result) => {
                    tracing::warn!("Maven version check exited with {:?}", result.status());
                    tracing::debug!(
                        "Version check output:\n{}\n{}",
                        result.stdout(),
                        result.stderr()
                    );
                    return Ok(false);
                }
                Err(LaunchError::Interrupted) => return Err(RunError::Interrupted),
                Err(e) => tracing::warn!("Maven version check failed ({strategy}): {e}"),
            }
        }

        Ok(false)
    }

    /// Turns a finished build into an outcome.
    fn conclude(
        &self,
        result: InvocationResult,
        strategy: Strategy,
        project_dir: &Path,
    ) -> Result<Outcome, RunError> {
        tracing::debug!("Maven stdout:\n{}", result.stdout());
        if !result.stderr().is_empty() {
            tracing::debug!("Maven stderr:\n{}", result.stderr());
        }

        if !result.success() {
            let code = result.status().unwrap_or(EXIT_FAILURE);
            return Err(RunError::BuildFailed {
                code,
                excerpt: result.stderr_tail(self.config.excerpt_lines()),
            });
        }

        let elapsed = result.elapsed();
        tracing::info!(
            "Build succeeded ({strategy}) in {:.2} seconds",
            elapsed.as_secs_f64()
        );

        let output_dir = self.config.output_dir_in(project_dir);
        let artifacts = match artifacts::scan(&output_dir, self.config.filter()) {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Could not read {}: {e}", output_dir.display());
                Vec::new()
            }
        };
        if artifacts.is_empty() {
            tracing::warn!("No artifacts found in {}", output_dir.display());
        } else {
            tracing::info!("Found {} artifact(s)", artifacts.len());
            for artifact in &artifacts {
                match artifact.size_mb() {
                    Some(mb) => tracing::info!("- {} ({mb:.2} MB)", artifact.name()),
                    None => tracing::info!("- {} (details unavailable)", artifact.name()),
                }
            }
        }

        Ok(Outcome::Built {
            artifacts,
            elapsed,
            strategy,
        })
    }

    /// Degraded path: report artifacts left by an earlier build, if any.
    fn fallback(&self, project_dir: &Path) -> Result<Outcome, RunError> {
        let output_dir = self.config.output_dir_in(project_dir);
        fallback_outcome(artifacts::scan(&output_dir, self.config.filter()), &output_dir)
    }
}

/// Decides the degraded-path outcome from a scan of `output_dir`.
fn fallback_outcome(
    scan: io::Result<Vec<Artifact>>,
    output_dir: &Path,
) -> Result<Outcome, RunError> {
    match scan {
        Ok(artifacts) if !artifacts.is_empty() => {
            tracing::warn!(
                "Maven is unavailable, but {} existing artifact(s) were found in {}",
                artifacts.len(),
                output_dir.display()
            );
            Ok(Outcome::Fallback { artifacts })
        }
        Ok(_) => Err(RunError::ToolUnavailable),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(RunError::PermissionDenied(
            format!("cannot read {}", output_dir.display()),
        )),
        Err(e) => {
            tracing::error!("Could not read {}: {e}", output_dir.display());
            Err(RunError::ToolUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> PathBuf {
        PathBuf::from("/srv/app/target")
    }

    #[test]
    fn unreadable_output_dir_is_a_permission_error() {
        let scan = Err(io::Error::from(io::ErrorKind::PermissionDenied));
        let err = fallback_outcome(scan, &target()).unwrap_err();

        assert!(matches!(&err, RunError::PermissionDenied(what) if what.contains("target")));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn other_read_errors_mean_the_tool_is_unavailable() {
        let scan = Err(io::Error::other("disk on fire"));
        let err = fallback_outcome(scan, &target()).unwrap_err();

        assert!(matches!(err, RunError::ToolUnavailable));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn empty_scan_means_the_tool_is_unavailable() {
        let err = fallback_outcome(Ok(Vec::new()), &target()).unwrap_err();
        assert!(matches!(err, RunError::ToolUnavailable));
    }
}
