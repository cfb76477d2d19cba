use anyhow::Result;

use crate::adapters::{self, AdapterKind};
use crate::worktree::WorktreeManager;

/// Opens the worktree `id` in the configured editor (or `editor_override`)
///
/// # Errors
/// Returns an error if:
/// - No existing worktree matches `id`
/// - No editor is configured, or it cannot be found
/// - The editor exits with a non-zero status
pub fn open_in_editor(
    manager: &WorktreeManager,
    id: &str,
    editor_override: Option<&str>,
) -> Result<()> {
    let entry = manager.resolve_existing(id)?;
    let value = editor_override.or(manager.settings().editor.as_deref());
    let editor = adapters::resolve(AdapterKind::Editor, value)?;

    println!("Opening {} in {}", entry.path.display(), editor.name);
    editor.open_editor(&entry.path)
}
