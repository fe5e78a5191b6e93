#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Build descriptor that marks a directory as a Maven project.
pub const DESCRIPTOR: &str = "pom.xml";

/// Directory Maven writes packaged output into.
pub const OUTPUT_DIR: &str = "target";

/// Arguments for the packaging invocation.
pub const BUILD_ARGS: &[&str] = &["clean", "package"];

/// Arguments for the availability probe.
pub const VERSION_ARGS: &[&str] = &["-version"];

/// Marker for the banner line printed by `mvn -version`.
pub const VERSION_BANNER: &str = "Apache Maven";

/// Jar name suffixes for source and test bundles, which are not reported.
pub const EXCLUDED_SUFFIXES: &[&str] = &["-sources", "-tests"];

/// Number of trailing stderr lines shown when a build fails.
pub const ERROR_EXCERPT_LINES: usize = 10;

/// Directory, under the working directory, that receives log files.
pub const LOG_DIR: &str = "logs";

/// Exit code for a successful build.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for any hard failure.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code when Maven is unavailable but earlier artifacts exist.
pub const EXIT_FALLBACK: i32 = 2;

/// Exit code for an interrupted run.
pub const EXIT_INTERRUPTED: i32 = if cfg!(windows) { 1 } else { 130 };

/// Where to get Maven from.
pub const MAVEN_DOWNLOAD_URL: &str = "https://maven.apache.org/download.cgi";
