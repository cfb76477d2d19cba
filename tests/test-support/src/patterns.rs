#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

use anyhow::Result;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Writes a `.gtr.toml` with the given body at the repository root
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_shared_config(repo_dir: &ChildPath, body: &str) -> Result<()> {
    repo_dir.child(".gtr.toml").write_str(body)?;
    Ok(())
}

/// Create untracked local files that typical copy patterns pick up
///
/// # Errors
/// Returns an error if a file cannot be written
pub fn create_local_files(repo_dir: &ChildPath) -> Result<()> {
    repo_dir.child(".env").write_str("TEST_VAR=test_value")?;
    repo_dir.child(".env.secret").write_str("TOKEN=hunter2")?;

    repo_dir
        .child(".vscode")
        .child("settings.json")
        .write_str(r#"{"editor.fontSize": 14}"#)?;

    repo_dir
        .child("config")
        .child("app.local.json")
        .write_str(r#"{"debug": true}"#)?;

    Ok(())
}

/// Assert that the files from [`create_local_files`] were copied, except
/// `.env.secret`
///
/// # Errors
/// Never; returns `Result` for use with `?`
pub fn assert_local_files_copied(worktree_path: &ChildPath) -> Result<()> {
    worktree_path
        .child(".env")
        .assert(predicate::str::contains("TEST_VAR=test_value"));

    worktree_path
        .child(".vscode")
        .child("settings.json")
        .assert(predicate::str::contains("editor.fontSize"));

    worktree_path
        .child("config")
        .child("app.local.json")
        .assert(predicate::str::contains("debug"));

    worktree_path
        .child(".env.secret")
        .assert(predicate::path::missing());

    Ok(())
}
