use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    crate::common::redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with one commit tracking `1.txt`, `a/2.txt`, and `a/b/3.txt`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_kit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let file1 = FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string());
    write_file(file1);

    let file2 = FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    );
    write_file(file2);

    let file3 = FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    );
    write_file(file3);

    run_kit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    kit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_kit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("kit").expect("Failed to find kit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn kit_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_kit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("KIT_COMMIT_DATE", &"2023-01-01 12:00:00 +0000".to_string()), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd
}

/// Extract the abbreviated commit id from `[abc1234] message` output
pub fn committed_short_oid(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .trim_start_matches('[')
        .split(']')
        .next()
        .expect("Missing commit id in output")
        .to_string()
}

/// Extract the full commit ids printed by `kit log`, newest first
pub fn logged_commit_ids(dir: &Path) -> Vec<String> {
    let output = run_kit_command(dir, &["log"])
        .output()
        .expect("Failed to run kit log");
    let stdout = String::from_utf8_lossy(&output.stdout);

    stdout
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(|oid| oid.trim().to_string())
        .collect()
}
