//! Lifecycle hooks: shell commands configured under `gtr.hook.*`.
//!
//! Commands run through `sh -c`, one after another in configuration order,
//! with these variables set:
//!
//! - `REPO_ROOT`: main checkout of the repository
//! - `WORKTREE_PATH`: worktree the hook is about
//! - `BRANCH`: branch checked out there (empty when detached)

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    PostCreate,
    PreRemove,
    PostRemove,
}

impl HookPoint {
    /// A failing hook at this point stops the operation it guards.
    #[must_use]
    pub fn blocks_on_failure(self) -> bool {
        matches!(self, HookPoint::PreRemove)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPoint::PostCreate => "postCreate",
            HookPoint::PreRemove => "preRemove",
            HookPoint::PostRemove => "postRemove",
        };
        f.write_str(name)
    }
}

/// What the hooks are running for.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub repo_root: PathBuf,
    pub worktree_path: PathBuf,
    pub branch: Option<String>,
}

impl HookContext {
    /// Working directory for hooks at `point`. Post-remove hooks run from the
    /// repository root since the worktree is gone by then.
    #[must_use]
    pub fn working_dir(&self, point: HookPoint) -> &Path {
        match point {
            HookPoint::PostCreate | HookPoint::PreRemove => &self.worktree_path,
            HookPoint::PostRemove => &self.repo_root,
        }
    }

    fn vars(&self) -> [(&'static str, String); 3] {
        [
            ("REPO_ROOT", self.repo_root.display().to_string()),
            ("WORKTREE_PATH", self.worktree_path.display().to_string()),
            ("BRANCH", self.branch.clone().unwrap_or_default()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub command: String,
    pub exit_code: Option<i32>,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "'{}' exited with status {}", self.command, code),
            None => write!(f, "'{}' was terminated by a signal", self.command),
        }
    }
}

#[derive(Debug, Default)]
pub struct HookReport {
    pub ran: usize,
    pub failures: Vec<HookFailure>,
}

/// Runs `commands` for `point`.
///
/// Every command runs even when an earlier one fails; failures are collected
/// in the report. For blocking points, execution stops at the first failure.
///
/// # Errors
/// Returns an error if a command cannot be spawned at all
pub fn run_hooks(point: HookPoint, commands: &[String], ctx: &HookContext) -> Result<HookReport> {
    let mut report = HookReport::default();

    for cmd in commands {
        let cmd = cmd.trim();
        if cmd.is_empty() {
            continue;
        }

        println!("Running {} hook: {}", point, cmd);
        tracing::debug!(%point, cmd, cwd = %ctx.working_dir(point).display(), "spawning hook");

        let status = Command::new("sh")
            .args(["-c", cmd])
            .current_dir(ctx.working_dir(point))
            .envs(ctx.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to spawn {} hook: {}", point, cmd))?;

        report.ran += 1;

        if !status.success() {
            let failure = HookFailure {
                command: cmd.to_string(),
                exit_code: status.code(),
            };
            tracing::warn!(%point, "hook failed: {}", failure);
            report.failures.push(failure);

            if point.blocks_on_failure() {
                break;
            }
        }
    }

    Ok(report)
}
