#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use colored::Colorize;
use tabled::{Table, Tabled, settings::Style};

use crate::{
    artifacts::Artifact,
    constants::{EXIT_FALLBACK, EXIT_SUCCESS, MAVEN_DOWNLOAD_URL},
    error::RunError,
    runner::Outcome,
};

/// Shown in place of a size or time that could not be read.
const DETAILS_UNAVAILABLE: &str = "details unavailable";

/// One row of the artifact table.
#[derive(Tabled)]
struct ArtifactRow {
    /// File name.
    #[tabled(rename = "Artifact")]
    name:     String,
    /// Human readable size.
    #[tabled(rename = "Size")]
    size:     String,
    /// Last modification time.
    #[tabled(rename = "Last modified")]
    modified: String,
}

impl From<&Artifact> for ArtifactRow {
    fn from(artifact: &Artifact) -> Self {
        Self {
            name:     artifact.name().to_string(),
            size:     artifact
                .size_mb()
                .map_or_else(|| DETAILS_UNAVAILABLE.to_string(), |mb| format!("{mb:.2} MB")),
            modified: artifact.modified().map_or_else(
                || DETAILS_UNAVAILABLE.to_string(),
                |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
        }
    }
}

/// Renders artifacts as a table.
pub fn artifact_table(artifacts: &[Artifact]) -> String {
    let rows: Vec<ArtifactRow> = artifacts.iter().map(ArtifactRow::from).collect();
    Table::new(rows).with(Style::modern()).to_string()
}

/// Prints the opening lines of a run.
pub fn announce(project_dir: &Path, command_line: &str) {
    println!("\nPackaging project: {}", project_dir.display());
    println!("Running: {command_line}");
}

/// Describes an outcome for the terminal.
pub fn render(outcome: &Outcome) -> String {
    let mut lines = Vec::new();

    match outcome {
        Outcome::Built {
            artifacts, elapsed, ..
        } => {
            lines.push(format!("\n{}", "Build succeeded!".green().bold()));
            lines.push(format!("Elapsed: {:.2} seconds", elapsed.as_secs_f64()));
            if artifacts.is_empty() {
                lines.push(format!(
                    "\n{} no JAR files found in the output directory",
                    "Warning:".yellow()
                ));
            } else {
                lines.push(String::from("\nBuilt artifacts:"));
                lines.push(artifact_table(artifacts));
            }
        }
        Outcome::Fallback { artifacts } => {
            lines.push(format!(
                "\n{} Maven is unavailable, but existing JAR files were found:",
                "Note:".yellow().bold()
            ));
            lines.push(artifact_table(artifacts));
            lines.push(String::from("\nIf these are up to date, you can use them directly."));
        }
        Outcome::Failed(err) => {
            lines.push(format!("\n{} {err}", "Error:".red().bold()));
            match err {
                RunError::BuildFailed { excerpt, .. } if !excerpt.is_empty() => {
                    lines.push(String::from("\nMost recent error output:"));
                    lines.extend(excerpt.iter().cloned());
                }
                RunError::ToolUnavailable => {
                    lines.push(format!(
                        "\nHint: download Maven from {MAVEN_DOWNLOAD_URL} and add its bin \
                         directory to PATH."
                    ));
                }
                _ => {}
            }
        }
    }

    lines.join("\n")
}

/// Closing line for an exit code, pointing at the log file on failure.
pub fn summary(exit_code: i32, log_path: &Path) -> String {
    match exit_code {
        EXIT_SUCCESS => format!("\n{}", "Packaging completed successfully.".green()),
        EXIT_FALLBACK => format!(
            "\n{}",
            "Maven is unavailable, but existing JAR files were found.".yellow()
        ),
        _ => format!(
            "\n{}\nSee {} for details, including PATH and Maven lookup results.",
            "Packaging failed.".red(),
            log_path.display()
        ),
    }
}

/// Prints the outcome followed by the closing summary.
pub fn print(outcome: &Outcome, log_path: &Path) {
    println!("{}", render(outcome));
    println!("{}", summary(outcome.exit_code(), log_path));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_lists_excerpt_lines() {
        colored::control::set_override(false);
        let outcome = Outcome::Failed(RunError::BuildFailed {
            code:    1,
            excerpt: vec!["[ERROR] one".into(), "[ERROR] two".into()],
        });
        let text = render(&outcome);
        assert!(text.contains("Maven exited with code 1"));
        assert!(text.ends_with("[ERROR] one\n[ERROR] two"));
    }

    #[test]
    fn unavailable_includes_hint() {
        colored::control::set_override(false);
        let text = render(&Outcome::Failed(RunError::ToolUnavailable));
        assert!(text.contains(MAVEN_DOWNLOAD_URL));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_artifact_details_are_marked_unavailable() {
        use crate::{artifacts, config::ArtifactFilter};

        let dir = std::env::temp_dir().join(format!("mvnpack-report-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::os::unix::fs::symlink(dir.join("gone.bin"), dir.join("app-1.0.jar")).unwrap();

        let found = artifacts::scan(&dir, &ArtifactFilter::default()).unwrap();
        let row = ArtifactRow::from(&found[0]);
        assert_eq!(row.name, "app-1.0.jar");
        assert_eq!(row.size, DETAILS_UNAVAILABLE);
        assert_eq!(row.modified, DETAILS_UNAVAILABLE);
        assert!(artifact_table(&found).contains(DETAILS_UNAVAILABLE));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn summary_mentions_log_on_failure() {
        colored::control::set_override(false);
        let log = Path::new("logs/package_20240101_000000.log");
        assert!(summary(1, log).contains("package_20240101_000000.log"));
        assert!(!summary(0, log).contains("package_"));
        assert!(summary(2, log).contains("existing JAR files"));
    }
}
