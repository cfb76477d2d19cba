use anyhow::{Context, Result};
use std::process::Command;

use crate::error::GtrError;
use crate::worktree::WorktreeManager;

/// Runs `command` inside the worktree `id` and returns its exit code
///
/// # Errors
/// Returns an error if:
/// - No command is given
/// - No existing worktree matches `id`
/// - The command cannot be started
pub fn run_in_worktree(manager: &WorktreeManager, id: &str, command: &[String]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        return Err(GtrError::usage("no command given (usage: git gtr run <id> <command>...)").into());
    };

    let entry = manager.resolve_existing(id)?;
    tracing::debug!(program = %program, ?args, cwd = %entry.path.display(), "running command");

    let status = Command::new(program)
        .args(args)
        .current_dir(&entry.path)
        .status()
        .with_context(|| format!("Failed to run '{}'", program))?;

    Ok(status.code().unwrap_or(1))
}
