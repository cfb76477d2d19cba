use anyhow::Result;

use crate::prompt::Confirmer;
use crate::worktree::{BranchOrigin, CreateOptions, WorktreeManager};

/// Creates a worktree for `branch` and prints where it ended up
///
/// # Errors
/// Returns an error if:
/// - The branch name is invalid
/// - The branch already has a worktree (without `--force`)
/// - Fetching, branch creation or worktree registration fails
pub fn create_worktree(
    manager: &WorktreeManager,
    branch: &str,
    opts: &CreateOptions,
    confirmer: &dyn Confirmer,
) -> Result<()> {
    if opts.force {
        if let Some(existing) = manager.checked_out_at(branch)? {
            println!(
                "Branch '{}' is already checked out at {}",
                branch,
                existing.display()
            );
            if !confirmer.confirm("Create another worktree for it?", false)? {
                println!("Aborted.");
                return Ok(());
            }
        }
    }

    println!("Creating worktree for '{}'", branch);
    let created = manager.create(branch, opts)?;

    match &created.origin {
        BranchOrigin::Existing => println!("Using existing branch '{}'", branch),
        BranchOrigin::Tracking(upstream) => {
            println!("Created branch '{}' tracking {}", branch, upstream);
        }
        BranchOrigin::Created { from } => {
            println!("Created branch '{}' from {}", branch, from);
        }
    }

    if !created.copied.is_empty() {
        println!(
            "Copied {} file(s) and {} directory(ies) from the main checkout",
            created.copied.files.len(),
            created.copied.dirs.len()
        );
    }

    for failure in &created.hooks.failures {
        println!("⚠ Warning: postCreate hook {}", failure);
    }

    println!("✓ Worktree created: {}", created.entry.path.display());
    Ok(())
}
