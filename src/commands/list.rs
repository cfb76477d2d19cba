use anyhow::Result;

use crate::worktree::{WorktreeEntry, WorktreeManager};

const DETACHED: &str = "(detached)";

/// Prints every worktree of the repository, main checkout first
///
/// # Errors
/// Returns an error if git operations fail
pub fn list_worktrees(manager: &WorktreeManager, porcelain: bool) -> Result<()> {
    let entries = manager.list()?;
    let output = if porcelain {
        format_porcelain(&entries)
    } else {
        format_table(&entries)
    };
    print!("{}", output);
    Ok(())
}

/// `path<TAB>branch<TAB>status`, one line per worktree, no header.
///
/// Backslashes and control separators inside a field are escaped C-style
/// (`\\`, `\t`, `\n`, `\r`), keeping one record per line.
#[must_use]
pub fn format_porcelain(entries: &[WorktreeEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "{}\t{}\t{}\n",
                escape_field(&e.path.display().to_string()),
                escape_field(e.branch.as_deref().unwrap_or(DETACHED)),
                e.status
            )
        })
        .collect()
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[must_use]
pub fn format_table(entries: &[WorktreeEntry]) -> String {
    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|e| {
            let mut branch = e.branch.clone().unwrap_or_else(|| DETACHED.to_string());
            if e.is_main {
                branch.push_str(" [1]");
            }
            [branch, e.path.display().to_string(), e.status.to_string()]
        })
        .collect();

    let branch_width = rows.iter().map(|r| r[0].len()).max().unwrap_or(0).max(6);
    let path_width = rows.iter().map(|r| r[1].len()).max().unwrap_or(0).max(4);

    let mut out = format!(
        "{:<bw$}  {:<pw$}  STATUS\n",
        "BRANCH",
        "PATH",
        bw = branch_width,
        pw = path_width
    );
    for [branch, path, status] in rows {
        out.push_str(&format!(
            "{:<bw$}  {:<pw$}  {}\n",
            branch,
            path,
            status,
            bw = branch_width,
            pw = path_width
        ));
    }
    out
}
