use anyhow::Result;

use crate::worktree::WorktreeManager;

/// Prints the absolute path of the worktree `id` refers to, and nothing else
///
/// # Errors
/// Returns an error if no existing worktree matches `id`
pub fn print_worktree_path(manager: &WorktreeManager, id: &str) -> Result<()> {
    let entry = manager.resolve_existing(id)?;
    println!("{}", entry.path.display());
    Ok(())
}
