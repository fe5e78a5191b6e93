#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Dispatch, metadata::LevelFilter};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, prelude::*};

use crate::constants::LOG_DIR;

/// Log sink for one packaging run.
///
/// Nothing is installed globally: the runner scopes its work to
/// [`LogContext::dispatch`]. Buffered lines are flushed when the context is
/// dropped.
pub struct LogContext {
    /// Path of the log file being written.
    path:     PathBuf,
    /// Subscriber that writes to the log file.
    dispatch: Dispatch,
    /// Keeps the background writer alive until the context is dropped.
    _guard:   WorkerGuard,
}

impl LogContext {
    /// Creates `log_dir` if needed and opens a new
    /// `package_<YYYYMMDD_HHMMSS>.log` file inside it.
    pub fn create(log_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Could not create log directory {}", log_dir.display()))?;

        let stem = format!("package_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&stem)
            .filename_suffix("log")
            .build(log_dir)
            .with_context(|| format!("Could not open a log file in {}", log_dir.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true);
        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(LevelFilter::DEBUG);

        Ok(Self {
            path:     log_dir.join(format!("{stem}.log")),
            dispatch: Dispatch::new(subscriber),
            _guard:   guard,
        })
    }

    /// Opens a log file under `logs/` in the current working directory.
    pub fn in_working_dir() -> Result<Self> {
        let cwd = std::env::current_dir().context("Could not determine the working directory")?;
        Self::create(&cwd.join(LOG_DIR))
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscriber that writes to this context's file.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}
