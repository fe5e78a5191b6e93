#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::{OsStr, OsString},
    fmt::{self, Display},
    future::Future,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use itertools::Itertools;
use which::which_in;

use crate::{config::RunnerConfig, constants::VERSION_BANNER, error::LaunchError, process};

/// How the external tool is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Spawn the executable directly with an argument vector.
    Direct,
    /// Hand the command line to the platform shell (`sh -c` or `cmd /C`).
    Shell,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Direct => write!(f, "direct"),
            Strategy::Shell => write!(f, "shell"),
        }
    }
}

/// The Maven executable chosen for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// Name as invoked, e.g. `mvn` or `mvn.cmd`.
    name:     String,
    /// Location on the search path, if lookup succeeded.
    resolved: Option<PathBuf>,
}

impl Tool {
    /// Name the tool is invoked by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the tool was found on the search path, if anywhere.
    pub fn resolved(&self) -> Option<&Path> {
        self.resolved.as_deref()
    }

    /// Program handed to the launcher.
    pub fn program(&self) -> OsString {
        match &self.resolved {
            Some(path) => path.clone().into_os_string(),
            None => OsString::from(&self.name),
        }
    }
}

/// Looks up each configured tool name on the search path and returns the
/// first hit. Falls back to the bare name when nothing resolves, since the
/// shell may still find it where path lookup does not.
pub fn locate(config: &RunnerConfig, cwd: &Path) -> Tool {
    let search_path = config.search_path();
    tracing::debug!("Searching for Maven on {:?}", search_path);

    for name in config.tool_names() {
        match which_in(name, search_path.as_ref(), cwd) {
            Ok(path) => {
                tracing::info!("Found Maven command {} at {}", name, path.display());
                return Tool {
                    name:     name.clone(),
                    resolved: Some(path),
                };
            }
            Err(e) => tracing::debug!("{name} not found on search path: {e}"),
        }
    }

    let name = config.bare_tool_name().to_string();
    tracing::warn!("Maven was not found on the search path, trying '{name}' directly");
    Tool {
        name,
        resolved: None,
    }
}

/// A fully described invocation of the external tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program to run.
    program:  OsString,
    /// Arguments, in order.
    args:     Vec<String>,
    /// Working directory, if not inherited.
    cwd:      Option<PathBuf>,
    /// How to start the program.
    strategy: Strategy,
}

impl ToolCommand {
    /// Describes running `program args...` with the given strategy.
    pub fn new(
        program: impl Into<OsString>,
        args: &[String],
        cwd: Option<&Path>,
        strategy: Strategy,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
            strategy,
        }
    }

    /// Program to run.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if not inherited.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// How to start the program.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Space-joined command line, as handed to the shell.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .join(" ")
    }
}

/// Outcome of one completed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Exit code, `None` if the process was killed by a signal.
    status:  Option<i32>,
    /// Captured stdout.
    stdout:  String,
    /// Captured stderr.
    stderr:  String,
    /// Time from spawn to exit.
    elapsed: Duration,
}

impl InvocationResult {
    /// Captures the outcome of a finished command.
    pub fn new(
        status: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
            elapsed,
        }
    }

    /// Exit code, if the process exited normally.
    pub fn status(&self) -> Option<i32> {
        self.status
    }

    /// True if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Captured stdout.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured stderr.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Time from spawn to exit.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The last `n` lines of stderr, ignoring trailing blank lines.
    pub fn stderr_tail(&self, n: usize) -> Vec<String> {
        let trimmed = self.stderr.trim_end();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let lines: Vec<&str> = trimmed.lines().collect();
        lines[lines.len().saturating_sub(n)..]
            .iter()
            .map(|line| line.to_string())
            .collect()
    }

    /// The `Apache Maven x.y.z` banner line, if this was a version probe.
    pub fn version_banner(&self) -> Option<&str> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .find(|line| line.contains(VERSION_BANNER))
            .map(str::trim)
    }
}

/// Starts external commands. The runner only talks to the tool through this.
pub trait Launcher {
    /// Runs `command` to completion and captures its output.
    fn launch(
        &self,
        command: &ToolCommand,
    ) -> impl Future<Output = Result<InvocationResult, LaunchError>>;
}

/// Launches real processes through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    /// Program and arguments that realise `command` under its strategy.
    fn argv(command: &ToolCommand) -> (OsString, Vec<OsString>) {
        match command.strategy() {
            Strategy::Direct => (
                command.program().to_os_string(),
                command.args().iter().map(OsString::from).collect(),
            ),
            Strategy::Shell if cfg!(windows) => (
                OsString::from("cmd"),
                vec![OsString::from("/C"), OsString::from(command.command_line())],
            ),
            Strategy::Shell => (
                OsString::from("sh"),
                vec![OsString::from("-c"), OsString::from(command.command_line())],
            ),
        }
    }
}

impl Launcher for SystemLauncher {
    async fn launch(&self, command: &ToolCommand) -> Result<InvocationResult, LaunchError> {
        let (program, args) = Self::argv(command);
        tracing::debug!(
            "Launching {} ({} strategy)",
            command.command_line(),
            command.strategy()
        );

        let collected = process::run_collect(&program, &args, command.cwd())
            .await
            .map_err(|e| classify(e, &program))?;

        Ok(InvocationResult::new(
            collected.status.code(),
            String::from_utf8_lossy(&collected.stdout),
            String::from_utf8_lossy(&collected.stderr),
            collected.elapsed,
        ))
    }
}

/// Sorts a spawn failure into the launch error taxonomy.
fn classify(err: anyhow::Error, program: &OsStr) -> LaunchError {
    let program = program.to_string_lossy().into_owned();
    match err.downcast_ref::<io::Error>().map(io::Error::kind) {
        Some(io::ErrorKind::NotFound) => LaunchError::NotFound(program),
        Some(io::ErrorKind::PermissionDenied) => LaunchError::PermissionDenied(program),
        _ => LaunchError::Other(err),
    }
}
