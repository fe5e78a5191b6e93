#![allow(deprecated)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("mvnpack-cli-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

fn mvnpack(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mvnpack").expect("binary exists");
    cmd.current_dir(workdir).env("CLICOLOR", "0");
    cmd
}

#[test]
fn help_exits_cleanly() {
    let root = temp_root();
    let output = mvnpack(&root).arg("--help").output().expect("run mvnpack");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PROJECT_DIR"));
    assert!(stdout.contains("Exit codes"));
    // Help runs before any log file is opened.
    assert!(!root.join("logs").exists());
    let _ = fs::remove_dir_all(root);
}

#[test]
fn directory_without_pom_fails_and_logs() {
    let root = temp_root();
    fs::create_dir_all(root.join("plain")).unwrap();

    mvnpack(&root).arg("plain").assert().code(1);

    let logs: Vec<_> = fs::read_dir(root.join("logs"))
        .expect("logs directory created")
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("package_") && logs[0].ends_with(".log"));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_directory_fails() {
    let root = temp_root();
    mvnpack(&root).arg("nope").assert().code(1);
    let _ = fs::remove_dir_all(root);
}

#[cfg(unix)]
#[test]
fn unreachable_maven_reports_existing_jars() {
    let root = temp_root();
    let project = root.join("app");
    fs::create_dir_all(project.join("target")).unwrap();
    fs::create_dir_all(root.join("empty-bin")).unwrap();
    fs::write(project.join("pom.xml"), "<project/>").unwrap();
    fs::write(project.join("target/app-1.0.jar"), b"jar").unwrap();
    fs::write(project.join("target/app-1.0-sources.jar"), b"src").unwrap();

    // Neither mvn nor sh can be found on this PATH.
    let output = mvnpack(&root)
        .env("PATH", root.join("empty-bin"))
        .arg("app")
        .output()
        .expect("run mvnpack");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("app-1.0.jar"));
    assert!(!stdout.contains("app-1.0-sources.jar"));
    let _ = fs::remove_dir_all(root);
}
