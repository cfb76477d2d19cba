#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

//! Integration tests for `git gtr new`

use anyhow::Result;
use assert_fs::prelude::*;
use predicates::prelude::*;

use test_support::{
    CliTestEnvironment, assert_local_files_copied, create_local_files, write_shared_config,
};

#[test]
fn test_new_creates_branch_from_origin_default() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["new", "feature/auth"])?
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created branch 'feature/auth' from origin/main",
        ))
        .stdout(predicate::str::contains("✓ Worktree created"));

    let worktree = env.worktree_path("feature/auth");
    worktree.assert(predicate::path::is_dir());
    worktree.child("README.md").assert(predicate::path::exists());

    let head = env.git_in(worktree.path(), &["rev-parse", "--abbrev-ref", "HEAD"])?;
    assert_eq!(head, "feature/auth");

    Ok(())
}

#[test]
fn test_new_uses_existing_local_branch() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.git(&["branch", "existing"])?;

    env.run_command(&["new", "existing", "--no-fetch"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Using existing branch 'existing'"));

    env.worktree_path("existing").assert(predicate::path::is_dir());
    Ok(())
}

#[test]
fn test_new_tracks_remote_only_branch() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.git(&["push", "--quiet", "origin", "main:refs/heads/remote-only"])?;

    env.run_command(&["new", "remote-only"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("tracking origin/remote-only"));

    let upstream = env.git(&["rev-parse", "--abbrev-ref", "remote-only@{upstream}"])?;
    assert_eq!(upstream, "origin/remote-only");
    Ok(())
}

#[test]
fn test_new_track_remote_requires_remote_branch() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["new", "nowhere", "--track", "remote", "--no-fetch"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "remote branch 'origin/nowhere' not found",
        ));

    env.worktree_path("nowhere").assert(predicate::path::missing());
    Ok(())
}

#[test]
fn test_new_track_local_requires_local_branch() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["new", "nope", "--track", "local", "--no-fetch"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("local branch 'nope' not found"));
    Ok(())
}

#[test]
fn test_new_track_none_refuses_existing_branch() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.git(&["branch", "taken"])?;

    env.run_command(&["new", "taken", "--track", "none", "--no-fetch"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("branch 'taken' already exists"));
    Ok(())
}

#[test]
fn test_new_twice_fails_with_branch_exists() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.new_worktree("feature/dup")?;

    env.run_command(&["new", "feature/dup", "--no-fetch"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("feature-dup"));
    Ok(())
}

#[test]
fn test_new_force_with_name_adds_second_worktree() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.new_worktree("feature/dup")?;

    env.run_command(&[
        "new",
        "feature/dup",
        "--no-fetch",
        "--force",
        "--name",
        "second",
        "--yes",
    ])?
    .assert()
    .success();

    let second = env.worktrees_dir.child("feature-dup-second");
    second.assert(predicate::path::is_dir());
    let head = env.git_in(second.path(), &["rev-parse", "--abbrev-ref", "HEAD"])?;
    assert_eq!(head, "feature/dup");
    Ok(())
}

#[test]
fn test_new_with_folder_override() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["new", "feature/long-name", "--folder", "short", "--no-fetch"])?
        .assert()
        .success();

    let folder = env.worktrees_dir.child("short");
    folder.assert(predicate::path::is_dir());

    let output = env.stdout(&["go", "short"])?;
    assert_eq!(output, folder.path().to_string_lossy());
    Ok(())
}

#[test]
fn test_new_from_ref() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.git(&["checkout", "-q", "-b", "base"])?;
    env.repo_dir.child("base.txt").write_str("base")?;
    env.git(&["add", "base.txt"])?;
    env.git(&["commit", "-q", "-m", "base commit"])?;
    env.git(&["checkout", "-q", "main"])?;

    env.run_command(&["new", "feature/from-base", "--from", "base", "--no-fetch"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("from base"));

    env.worktree_path("feature/from-base")
        .child("base.txt")
        .assert(predicate::path::exists());
    Ok(())
}

#[test]
fn test_new_from_current_branch() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.git(&["checkout", "-q", "-b", "work"])?;
    env.repo_dir.child("work.txt").write_str("work")?;
    env.git(&["add", "work.txt"])?;
    env.git(&["commit", "-q", "-m", "work commit"])?;

    env.run_command(&["new", "feature/child", "--from-current", "--no-fetch"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("from work"));

    env.worktree_path("feature/child")
        .child("work.txt")
        .assert(predicate::path::exists());
    Ok(())
}

#[test]
fn test_new_rejects_invalid_branch_name() -> Result<()> {
    let env = CliTestEnvironment::new()?;

    env.run_command(&["new", "bad..name", "--no-fetch"])?
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid branch name"));
    Ok(())
}

#[test]
fn test_new_fetch_failure_is_reported() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.git(&["remote", "set-url", "origin", "/definitely/not/a/repo"])?;

    env.run_command(&["new", "feature/offline"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to fetch from 'origin'"));

    env.run_command(&["new", "feature/offline", "--no-fetch"])?
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_new_copies_local_files() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    create_local_files(&env.repo_dir)?;
    write_shared_config(
        &env.repo_dir,
        r#"
[copy]
include = [".env*", ".vscode", "**/*.local.json"]
exclude = ["*.secret"]
"#,
    )?;

    env.run_command(&["new", "feature/copy", "--no-fetch"])?
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied"));

    assert_local_files_copied(&env.worktree_path("feature/copy"))?;
    Ok(())
}

#[test]
fn test_new_no_copy_skips_files() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    create_local_files(&env.repo_dir)?;
    env.run_command(&["config", "add", "gtr.copy.include", ".env"])?
        .assert()
        .success();

    env.run_command(&["new", "feature/bare", "--no-copy", "--no-fetch"])?
        .assert()
        .success();

    env.worktree_path("feature/bare")
        .child(".env")
        .assert(predicate::path::missing());
    Ok(())
}

#[test]
fn test_new_uses_configured_dir_and_prefix() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    env.run_command(&["config", "set", "gtr.worktrees.dir", ".trees"])?
        .assert()
        .success();
    env.run_command(&["config", "set", "gtr.worktrees.prefix", "wt-"])?
        .assert()
        .success();

    env.run_command(&["new", "feature/x", "--no-fetch"])?
        .assert()
        .success();

    env.repo_dir
        .child(".trees")
        .child("wt-feature-x")
        .assert(predicate::path::is_dir());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_new_copies_symlinked_dependency_dirs() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    let modules = env.repo_dir.child("node_modules");
    modules
        .child(".pnpm")
        .child("foo")
        .child("index.js")
        .write_str("module.exports = 1;")?;
    std::os::unix::fs::symlink(".pnpm/foo", modules.child("foo").path())?;
    env.run_command(&["config", "add", "gtr.copy.includeDirs", "node_modules"])?
        .assert()
        .success();

    env.run_command(&["new", "feature/pnpm", "--no-fetch"])?
        .assert()
        .success();

    let copied = env.worktree_path("feature/pnpm").child("node_modules").child("foo");
    assert!(copied.path().symlink_metadata()?.file_type().is_symlink());
    copied.child("index.js").assert(predicate::path::is_file());
    Ok(())
}

#[test]
fn test_new_failure_after_checkout_leaves_nothing_behind() -> Result<()> {
    let env = CliTestEnvironment::new()?;
    create_local_files(&env.repo_dir)?;
    env.run_command(&["config", "add", "gtr.copy.include", ".env"])?
        .assert()
        .success();
    env.run_command(&["config", "add", "gtr.copy.exclude", "["])?
        .assert()
        .success();

    env.run_command(&["new", "feature/broken", "--no-fetch"])?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid copy pattern"));

    env.worktree_path("feature/broken")
        .assert(predicate::path::missing());
    assert!(env.git(&["branch", "--list", "feature/broken"])?.is_empty());
    assert!(!env.git(&["worktree", "list"])?.contains("feature-broken"));

    env.run_command(&["config", "unset", "gtr.copy.exclude"])?
        .assert()
        .success();
    env.new_worktree("feature/broken")?;
    Ok(())
}
