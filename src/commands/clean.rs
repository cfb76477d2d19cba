use anyhow::{Context, Result};
use std::fs;

use crate::prompt::Confirmer;
use crate::worktree::{CleanOptions, WorktreeManager};

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanArgs {
    pub dry_run: bool,
    pub force: bool,
    pub merged: bool,
}

/// Removes stale worktrees and empty leftover directories
///
/// # Errors
/// Returns an error if git operations fail or the worktrees directory
/// cannot be read
pub fn clean_worktrees(
    manager: &WorktreeManager,
    args: CleanArgs,
    confirmer: &dyn Confirmer,
) -> Result<()> {
    let candidates = manager.clean_candidates(&CleanOptions {
        merged: args.merged,
        force: args.force,
    })?;
    let empty_dirs = manager.empty_dirs()?;

    if candidates.is_empty() && empty_dirs.is_empty() {
        println!("Nothing to clean.");
        return Ok(());
    }

    println!("Found:");
    for candidate in &candidates {
        println!(
            "  {} ({}): {}",
            candidate.entry.id,
            candidate.entry.path.display(),
            candidate.reason
        );
    }
    for dir in &empty_dirs {
        println!("  {}: empty directory", dir.display());
    }

    if args.dry_run {
        println!("Dry run, nothing removed.");
        return Ok(());
    }

    let total = candidates.len() + empty_dirs.len();
    if !confirmer.confirm(&format!("Clean up {} item(s)?", total), false)? {
        println!("Aborted.");
        return Ok(());
    }

    let mut cleaned = 0;
    for candidate in &candidates {
        match manager.clean_one(candidate, args.force) {
            Ok(true) => {
                println!("✓ Removed {}", candidate.entry.id);
                cleaned += 1;
            }
            Ok(false) => println!(
                "⚠ Skipped {}: uncommitted changes (use --force to remove anyway)",
                candidate.entry.id
            ),
            Err(e) => println!(
                "⚠ Warning: Failed to remove {}: {:#}",
                candidate.entry.id, e
            ),
        }
    }

    for dir in &empty_dirs {
        fs::remove_dir(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
        println!("✓ Removed empty directory {}", dir.display());
        cleaned += 1;
    }

    println!("Cleaned {} of {} item(s).", cleaned, total);
    Ok(())
}
