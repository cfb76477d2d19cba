use anyhow::Result;

use crate::error::GtrError;
use crate::prompt::Confirmer;
use crate::worktree::{RemoveOptions, WorktreeEntry, WorktreeManager};

/// Removes the worktrees `ids` refer to after a single confirmation
///
/// Every identifier is resolved before anything is removed, so a typo in
/// one of them leaves all worktrees in place.
///
/// # Errors
/// Returns an error if:
/// - No identifiers are given, or one names the main checkout
/// - Any identifier cannot be resolved
/// - Removing a worktree fails
pub fn remove_worktrees(
    manager: &WorktreeManager,
    ids: &[String],
    opts: &RemoveOptions,
    confirmer: &dyn Confirmer,
) -> Result<()> {
    if ids.is_empty() {
        return Err(GtrError::usage("no worktree given (usage: git gtr rm <id>...)").into());
    }

    let mut targets: Vec<WorktreeEntry> = Vec::new();
    for id in ids {
        let entry = manager.resolve(id)?;
        if entry.is_main {
            return Err(GtrError::usage("the main checkout cannot be removed").into());
        }
        if !targets.iter().any(|t| t.path == entry.path) {
            targets.push(entry);
        }
    }

    println!("Worktrees to remove:");
    for entry in &targets {
        println!("  {} ({})", entry.id, entry.path.display());
    }
    if opts.delete_branch {
        println!("Their branches will be deleted too.");
    }

    let prompt = if targets.len() == 1 {
        "Remove this worktree?".to_string()
    } else {
        format!("Remove these {} worktrees?", targets.len())
    };
    if !confirmer.confirm(&prompt, false)? {
        println!("Aborted.");
        return Ok(());
    }

    let single = targets.len() == 1;
    let mut failed = 0;

    for entry in &targets {
        match manager.remove(entry, opts) {
            Ok(removed) => {
                println!("✓ Removed worktree: {}", entry.path.display());
                match removed.branch_deleted {
                    Some(Ok(branch)) => println!("✓ Deleted branch: {}", branch),
                    Some(Err(e)) => println!("⚠ Warning: Failed to delete branch: {}", e),
                    None => {}
                }
                for failure in &removed.hooks.failures {
                    println!("⚠ Warning: postRemove hook {}", failure);
                }
            }
            Err(e) if single => return Err(e),
            Err(e) => {
                eprintln!("Error: failed to remove {}: {:#}", entry.id, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("failed to remove {} of {} worktrees", failed, targets.len());
    }
    Ok(())
}
