use crate::common::command::{
    init_repository_dir, kit_commit, logged_commit_ids, run_kit_command,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;

mod common;

#[rstest]
fn checkout_replaces_the_working_tree(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "create", "feat"])
        .assert()
        .success();

    // diverge master
    write_file(FileSpec::new(
        dir.path().join("1.txt"),
        "master version".to_string(),
    ));
    run_kit_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success();
    kit_commit(dir.path(), "master change").assert().success();

    run_kit_command(dir.path(), &["checkout", "feat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to branch 'feat'"));

    let content = fs::read_to_string(dir.path().join("1.txt")).unwrap();
    assert_eq!(content, "one");
}

#[rstest]
fn checking_out_a_missing_branch_is_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["checkout", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No such branch exists."));
}

#[rstest]
fn checking_out_the_active_branch_is_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No need to checkout the current branch.",
        ));
}

#[rstest]
fn untracked_file_blocks_checkout(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "create", "feat"])
        .assert()
        .success();

    write_file(FileSpec::new(
        dir.path().join("untracked.txt"),
        "???".to_string(),
    ));

    run_kit_command(dir.path(), &["checkout", "feat"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "There is an untracked file in the way; delete it, or add and commit it first.",
        ));
}

#[rstest]
fn checkout_clears_the_stage(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["branch", "create", "feat"])
        .assert()
        .success();

    write_file(FileSpec::new(
        dir.path().join("1.txt"),
        "staged but never committed".to_string(),
    ));
    run_kit_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    run_kit_command(dir.path(), &["checkout", "feat"])
        .assert()
        .success();

    run_kit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "=== Staged Files ===\n\n=== Removed Files ===",
        ));
}

#[rstest]
fn restore_rewinds_one_file_to_its_head_version(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(
        dir.path().join("1.txt"),
        "scratch".to_string(),
    ));

    run_kit_command(dir.path(), &["restore", "1.txt"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("1.txt")).unwrap();
    assert_eq!(content, "one");
}

#[rstest]
fn restore_from_an_abbreviated_commit_id(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(
        dir.path().join("1.txt"),
        "newer".to_string(),
    ));
    run_kit_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success();
    kit_commit(dir.path(), "newer content").assert().success();

    // the initial commit is the second entry of the log
    let ids = logged_commit_ids(dir.path());
    let initial_short = &ids[1][..7];

    run_kit_command(dir.path(), &["restore", "--source", initial_short, "1.txt"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("1.txt")).unwrap();
    assert_eq!(content, "one");
}

#[rstest]
fn restoring_a_file_absent_from_the_commit_is_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(dir.path(), &["restore", "ghost.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "File does not exist in that commit.",
        ));
}

#[rstest]
fn restoring_from_an_unknown_commit_is_refused(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_kit_command(
        dir.path(),
        &["restore", "--source", "zzzzzzz", "1.txt"],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("No commit with that id exists."));
}
