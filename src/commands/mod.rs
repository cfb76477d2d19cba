//! One module per subcommand. Each takes already-parsed arguments, prints
//! its own output and returns `Ok` on success; `main` maps errors to exit
//! codes.

pub mod adapter;
pub mod ai;
pub mod clean;
pub mod config;
pub mod doctor;
pub mod editor;
pub mod go;
pub mod init;
pub mod list;
pub mod new;
pub mod remove;
pub mod run;

use anyhow::{Context, Result};

use crate::worktree::WorktreeManager;

/// Opens the repository containing the current directory
///
/// # Errors
/// Returns an error if the current directory is not inside a git repository
pub fn current_manager() -> Result<WorktreeManager> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    WorktreeManager::discover(&cwd)
}

/// Converts a child process exit code into one the OS will accept.
#[must_use]
pub fn clamp_exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
