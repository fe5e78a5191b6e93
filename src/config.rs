#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use bon::bon;

use crate::constants::{
    BUILD_ARGS, DESCRIPTOR, ERROR_EXCERPT_LINES, EXCLUDED_SUFFIXES, OUTPUT_DIR, VERSION_ARGS,
};

/// Returns the executable names Maven may be installed under on this platform.
pub fn default_tool_names() -> Vec<String> {
    if cfg!(windows) {
        vec!["mvn".into(), "mvn.cmd".into(), "mvn.bat".into()]
    } else {
        vec!["mvn".into()]
    }
}

/// Selects which files in the output directory count as artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFilter {
    /// Extension (without the dot) a file must carry.
    extension:         String,
    /// Stem suffixes marking auxiliary bundles, e.g. `-sources`.
    excluded_suffixes: Vec<String>,
}

impl ArtifactFilter {
    /// Creates a filter for `extension` that rejects the given stem suffixes.
    pub fn new(extension: impl Into<String>, excluded_suffixes: Vec<String>) -> Self {
        Self {
            extension: extension.into(),
            excluded_suffixes,
        }
    }

    /// Returns true if `file_name` names a primary artifact.
    pub fn accepts(&self, file_name: &str) -> bool {
        let Some(stem) = file_name.strip_suffix(&format!(".{}", self.extension)) else {
            return false;
        };
        !stem.is_empty()
            && !self
                .excluded_suffixes
                .iter()
                .any(|suffix| stem.ends_with(suffix.as_str()))
    }
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        Self::new(
            "jar",
            EXCLUDED_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[derive(Debug, Clone)]
/// Knobs for a single packaging run.
pub struct RunnerConfig {
    /// Executable names probed on the search path, in order.
    tool_names:    Vec<String>,
    /// File that marks a directory as a Maven project.
    descriptor:    String,
    /// Directory, relative to the project, the build writes into.
    output_dir:    PathBuf,
    /// Arguments for the packaging invocation.
    build_args:    Vec<String>,
    /// Arguments for the availability probe.
    version_args:  Vec<String>,
    /// Number of trailing stderr lines shown when the build fails.
    excerpt_lines: usize,
    /// Search path used instead of `PATH`, if set.
    search_path:   Option<OsString>,
    /// Which files in the output directory are reported.
    filter:        ArtifactFilter,
}

#[bon]
impl RunnerConfig {
    /// Builder-friendly constructor; every field falls back to the Maven
    /// defaults for this platform.
    #[builder(finish_fn = build)]
    pub fn new(
        tool_names: Option<Vec<String>>,
        #[builder(into)] descriptor: Option<String>,
        #[builder(into)] output_dir: Option<PathBuf>,
        build_args: Option<Vec<String>>,
        version_args: Option<Vec<String>>,
        excerpt_lines: Option<usize>,
        #[builder(into)] search_path: Option<OsString>,
        filter: Option<ArtifactFilter>,
    ) -> Self {
        let owned = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();

        Self {
            tool_names: tool_names.unwrap_or_else(default_tool_names),
            descriptor: descriptor.unwrap_or_else(|| DESCRIPTOR.to_string()),
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(OUTPUT_DIR)),
            build_args: build_args.unwrap_or_else(|| owned(BUILD_ARGS)),
            version_args: version_args.unwrap_or_else(|| owned(VERSION_ARGS)),
            excerpt_lines: excerpt_lines.unwrap_or(ERROR_EXCERPT_LINES),
            search_path,
            filter: filter.unwrap_or_default(),
        }
    }
}

impl RunnerConfig {
    /// Executable names probed on the search path.
    pub fn tool_names(&self) -> &[String] {
        &self.tool_names
    }

    /// Name used when no candidate resolves on the search path.
    pub fn bare_tool_name(&self) -> &str {
        self.tool_names.first().map(String::as_str).unwrap_or("mvn")
    }

    /// Build descriptor file name.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Output directory for a project rooted at `project_dir`.
    pub fn output_dir_in(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.output_dir)
    }

    /// Arguments for the packaging invocation.
    pub fn build_args(&self) -> &[String] {
        &self.build_args
    }

    /// Arguments for the availability probe.
    pub fn version_args(&self) -> &[String] {
        &self.version_args
    }

    /// Number of trailing stderr lines shown on failure.
    pub fn excerpt_lines(&self) -> usize {
        self.excerpt_lines
    }

    /// The search path to resolve executables against; `PATH` unless
    /// overridden.
    pub fn search_path(&self) -> Option<OsString> {
        self.search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
    }

    /// Artifact filter.
    pub fn filter(&self) -> &ArtifactFilter {
        &self.filter
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_drops_auxiliary_jars() {
        let filter = ArtifactFilter::default();
        assert!(filter.accepts("app-1.0.jar"));
        assert!(filter.accepts("app-1.0-shaded.jar"));
        assert!(!filter.accepts("app-1.0-sources.jar"));
        assert!(!filter.accepts("app-1.0-tests.jar"));
        assert!(!filter.accepts("app-1.0.war"));
        assert!(!filter.accepts("classes"));
        assert!(!filter.accepts(".jar"));
    }

    #[test]
    fn builder_overrides_and_defaults() {
        let cfg = RunnerConfig::builder()
            .descriptor("build.xml")
            .excerpt_lines(3)
            .search_path("/nowhere")
            .build();

        assert_eq!(cfg.descriptor(), "build.xml");
        assert_eq!(cfg.excerpt_lines(), 3);
        assert_eq!(cfg.search_path(), Some(OsString::from("/nowhere")));
        assert_eq!(cfg.build_args(), ["clean", "package"]);
        assert_eq!(cfg.version_args(), ["-version"]);
        assert_eq!(cfg.bare_tool_name(), "mvn");
        assert_eq!(
            cfg.output_dir_in(Path::new("/proj")),
            Path::new("/proj").join("target")
        );
    }
}
