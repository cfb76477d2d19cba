#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

use anyhow::{Context, Result};
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

use std::path::Path;
use std::process::Command;

/// Files the test repository ignores, so copied files don't make worktrees
/// dirty.
const GITIGNORE: &str = ".env\n.env.*\n.vscode/\n*.local.json\nnode_modules/\n";

/// A repository named `my-repo` with one commit on `main`, pushed to a bare
/// `origin`, plus private HOME and global git config.
pub struct CliTestEnvironment {
    pub repo_dir: ChildPath,
    pub origin_dir: ChildPath,
    pub worktrees_dir: ChildPath,
    pub home_dir: ChildPath,
    pub global_config: ChildPath,
    _temp_dir: TempDir,
}

impl CliTestEnvironment {
    /// Creates the repository, its origin and the isolated environment
    ///
    /// # Errors
    /// Returns an error if:
    /// - Failed to create temporary directory
    /// - Any git command fails
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        let repo_dir = temp_dir.child("my-repo");
        let origin_dir = temp_dir.child("origin.git");
        let worktrees_dir = temp_dir.child("my-repo-worktrees");
        let home_dir = temp_dir.child("home");
        let global_config = temp_dir.child("global.gitconfig");

        repo_dir.create_dir_all()?;
        origin_dir.create_dir_all()?;
        home_dir.create_dir_all()?;
        global_config.write_str("")?;

        let env = Self {
            repo_dir,
            origin_dir,
            worktrees_dir,
            home_dir,
            global_config,
            _temp_dir: temp_dir,
        };

        env.git_in(env.origin_dir.path(), &["init", "--bare"])?;
        env.git(&["init"])?;
        env.git(&["config", "user.name", "Test User"])?;
        env.git(&["config", "user.email", "test@example.com"])?;
        env.repo_dir.child("README.md").write_str("# Test Repo\n")?;
        env.repo_dir.child(".gitignore").write_str(GITIGNORE)?;
        env.git(&["add", "."])?;
        env.git(&["commit", "-m", "Initial commit"])?;
        env.git(&["branch", "-M", "main"])?;

        let origin = env.origin_dir.path().to_string_lossy().to_string();
        env.git(&["remote", "add", "origin", &origin])?;
        env.git(&["push", "--quiet", "-u", "origin", "main"])?;

        Ok(env)
    }

    /// Run a git command in the repository directory
    ///
    /// # Errors
    /// Returns an error if git fails
    pub fn git(&self, args: &[&str]) -> Result<String> {
        self.git_in(self.repo_dir.path(), args)
    }

    /// Run a git command in `dir` with the isolated environment
    ///
    /// # Errors
    /// Returns an error if git fails
    pub fn git_in(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(dir);
        self.isolate(&mut cmd);
        let output = cmd.output().context("Failed to execute git command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git command {:?} failed: {}", args, stderr);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn isolate(&self, cmd: &mut Command) {
        cmd.env("HOME", self.home_dir.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", self.global_config.path())
            .env("GTR_GLOBAL_CONFIG", self.global_config.path())
            .env_remove("RUST_LOG");
    }

    /// `git-gtr` with `args`, run from the main checkout
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_command(&self, args: &[&str]) -> Result<assert_cmd::Command> {
        self.run_command_in(self.repo_dir.path(), args)
    }

    /// `git-gtr` with `args`, run from `dir`
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_command_in(&self, dir: &Path, args: &[&str]) -> Result<assert_cmd::Command> {
        let mut cmd =
            assert_cmd::Command::cargo_bin("git-gtr").context("Failed to find git-gtr binary")?;

        cmd.current_dir(dir)
            .env("HOME", self.home_dir.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_CONFIG_GLOBAL", self.global_config.path())
            .env("GTR_GLOBAL_CONFIG", self.global_config.path())
            .env_remove("RUST_LOG");

        cmd.args(args);
        Ok(cmd)
    }

    /// Runs `args` and returns trimmed stdout, asserting success
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found or prints invalid UTF-8
    pub fn stdout(&self, args: &[&str]) -> Result<String> {
        let assert = self.run_command(args)?.assert().success();
        Ok(String::from_utf8(assert.get_output().stdout.clone())?
            .trim()
            .to_string())
    }

    /// Creates a worktree without fetching, asserting success
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn new_worktree(&self, branch: &str) -> Result<()> {
        self.run_command(&["new", branch, "--no-fetch"])?
            .assert()
            .success();
        Ok(())
    }

    /// Where the default layout puts the worktree for `branch`
    #[must_use]
    pub fn worktree_path(&self, branch_name: &str) -> ChildPath {
        let sanitized = branch_name.replace('/', "-");
        self.worktrees_dir.child(sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn test_cli_test_environment_creation() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        env.repo_dir.assert(predicate::path::is_dir());
        env.repo_dir.child(".git").assert(predicate::path::exists());
        env.repo_dir
            .child("README.md")
            .assert(predicate::str::contains("# Test Repo"));
        assert_eq!(env.git(&["rev-parse", "--abbrev-ref", "HEAD"])?, "main");
        assert!(env.git(&["branch", "-r"])?.contains("origin/main"));

        Ok(())
    }

    #[test]
    fn test_worktree_path_sanitization() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        let path = env.worktree_path("feature/test-branch");
        assert!(path.path().ends_with("my-repo-worktrees/feature-test-branch"));

        Ok(())
    }
}
