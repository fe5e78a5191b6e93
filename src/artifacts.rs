#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

use crate::config::ArtifactFilter;

/// A packaged file found in the build output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name, e.g. `app-1.0.jar`.
    name:     String,
    /// Absolute path to the file.
    path:     PathBuf,
    /// Size in bytes, if the file's details could be read.
    size:     Option<u64>,
    /// Last modification time, if the file's details could be read.
    modified: Option<DateTime<Local>>,
}

impl Artifact {
    /// File name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Size in mebibytes, as shown to the user.
    pub fn size_mb(&self) -> Option<f64> {
        self.size.map(|bytes| bytes as f64 / (1024.0 * 1024.0))
    }

    /// Last modification time.
    pub fn modified(&self) -> Option<DateTime<Local>> {
        self.modified
    }
}

/// Lists the artifacts in `dir` that pass `filter`, sorted by file name.
///
/// Symlinks are followed. A missing directory yields an empty list. Entries
/// whose details cannot be read are still listed, without size or time;
/// failing to read the directory itself is an error.
pub fn scan(dir: &Path, filter: &ArtifactFilter) -> io::Result<Vec<Artifact>> {
    if !dir.is_dir() {
        tracing::debug!("Output directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !filter.accepts(&name) {
            continue;
        }

        let path = entry.path();
        let (size, modified) = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => continue,
            Ok(meta) => {
                let modified = meta
                    .modified()
                    .inspect_err(|e| {
                        tracing::warn!("Could not read modification time of {name}: {e}")
                    })
                    .ok()
                    .map(DateTime::<Local>::from);
                (Some(meta.len()), modified)
            }
            Err(e) => {
                tracing::warn!("Could not read details of {name}: {e}");
                (None, None)
            }
        };

        found.push(Artifact {
            path: std::path::absolute(path)?,
            name,
            size,
            modified,
        });
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mvnpack-scan-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_directory_has_no_artifacts() {
        let dir = std::env::temp_dir().join(format!("mvnpack-missing-{}", Uuid::new_v4()));
        assert!(scan(&dir, &ArtifactFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn directories_named_like_jars_are_skipped() {
        let dir = temp_dir();
        std::fs::create_dir_all(dir.join("exploded.jar")).unwrap();
        std::fs::write(dir.join("real.jar"), b"PK").unwrap();

        let found = scan(&dir, &ArtifactFilter::default()).unwrap();
        let names: Vec<&str> = found.iter().map(Artifact::name).collect();
        assert_eq!(names, vec!["real.jar"]);
        assert_eq!(found[0].size(), Some(2));
        assert!(found[0].modified().is_some());
        assert!(found[0].path().is_absolute());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_jars_are_listed_with_target_details() {
        let dir = temp_dir();
        let real = dir.join("store.bin");
        std::fs::write(&real, b"12345").unwrap();
        std::os::unix::fs::symlink(&real, dir.join("app-1.0.jar")).unwrap();

        let found = scan(&dir, &ArtifactFilter::default()).unwrap();
        let names: Vec<&str> = found.iter().map(Artifact::name).collect();
        assert_eq!(names, vec!["app-1.0.jar"]);
        assert_eq!(found[0].size(), Some(5));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[cfg(unix)]
    #[test]
    fn jars_without_readable_details_are_still_listed() {
        let dir = temp_dir();
        std::os::unix::fs::symlink(dir.join("gone.bin"), dir.join("dangling.jar")).unwrap();

        let found = scan(&dir, &ArtifactFilter::default()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "dangling.jar");
        assert_eq!(found[0].size(), None);
        assert_eq!(found[0].modified(), None);
        assert_eq!(found[0].size_mb(), None);

        let _ = std::fs::remove_dir_all(dir);
    }
}
