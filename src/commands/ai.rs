use anyhow::Result;

use crate::adapters::{self, AdapterKind};
use crate::worktree::WorktreeManager;

/// Starts the configured AI tool (or `ai_override`) inside the worktree `id`
/// and returns its exit code
///
/// # Errors
/// Returns an error if:
/// - No existing worktree matches `id`
/// - No AI tool is configured, or it cannot be found or started
pub fn start_ai(
    manager: &WorktreeManager,
    id: &str,
    ai_override: Option<&str>,
    extra_args: &[String],
) -> Result<i32> {
    let entry = manager.resolve_existing(id)?;
    let value = ai_override.or(manager.settings().ai.as_deref());
    let tool = adapters::resolve(AdapterKind::Ai, value)?;

    println!("Starting {} in {}", tool.name, entry.path.display());
    tool.run_ai(&entry.path, extra_args)
}
