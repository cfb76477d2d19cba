//! Editor and AI-tool adapters.
//!
//! An adapter value (from `gtr.editor.default`, `gtr.ai.default` or a
//! `--editor`/`--ai` flag) is either a built-in name such as `vscode`, or any
//! executable on `PATH` (or absolute path), optionally followed by arguments:
//!
//! ```text
//! git gtr config set gtr.editor.default "code --new-window"
//! ```

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GtrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Editor,
    Ai,
}

impl AdapterKind {
    fn flag(self) -> &'static str {
        match self {
            AdapterKind::Editor => "--editor",
            AdapterKind::Ai => "--ai",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            AdapterKind::Editor => "gtr.editor.default",
            AdapterKind::Ai => "gtr.ai.default",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Editor => f.write_str("editor"),
            AdapterKind::Ai => f.write_str("ai"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub name: &'static str,
    pub kind: AdapterKind,
    pub command: &'static str,
    pub args: &'static [&'static str],
    pub description: &'static str,
}

const fn editor(
    name: &'static str,
    command: &'static str,
    description: &'static str,
) -> AdapterDescriptor {
    AdapterDescriptor {
        name,
        kind: AdapterKind::Editor,
        command,
        args: &[],
        description,
    }
}

const fn ai(
    name: &'static str,
    command: &'static str,
    description: &'static str,
) -> AdapterDescriptor {
    AdapterDescriptor {
        name,
        kind: AdapterKind::Ai,
        command,
        args: &[],
        description,
    }
}

pub const BUILTIN: &[AdapterDescriptor] = &[
    editor("antigravity", "antigravity", "Google Antigravity"),
    editor("atom", "atom", "Atom"),
    editor("cursor", "cursor", "Cursor"),
    editor("emacs", "emacs", "GNU Emacs"),
    editor("idea", "idea", "IntelliJ IDEA"),
    editor("nano", "nano", "GNU nano"),
    editor("nvim", "nvim", "Neovim"),
    editor("pycharm", "pycharm", "PyCharm"),
    editor("sublime", "subl", "Sublime Text"),
    editor("vim", "vim", "Vim"),
    editor("vscode", "code", "Visual Studio Code"),
    editor("webstorm", "webstorm", "WebStorm"),
    editor("zed", "zed", "Zed"),
    ai("aider", "aider", "Aider pair programming"),
    ai("auggie", "auggie", "Augment Code CLI"),
    ai("claude", "claude", "Claude Code"),
    ai("codex", "codex", "OpenAI Codex CLI"),
    ai("continue", "cn", "Continue CLI"),
    ai("copilot", "copilot", "GitHub Copilot CLI"),
    ai("cursor", "cursor-agent", "Cursor agent CLI"),
    ai("gemini", "gemini", "Gemini CLI"),
    ai("opencode", "opencode", "opencode"),
];

/// Built-in adapters of `kind`, in table order
pub fn builtins(kind: AdapterKind) -> impl Iterator<Item = &'static AdapterDescriptor> {
    BUILTIN.iter().filter(move |a| a.kind == kind)
}

#[must_use]
pub fn find_builtin(kind: AdapterKind, name: &str) -> Option<&'static AdapterDescriptor> {
    builtins(kind).find(|a| a.name.eq_ignore_ascii_case(name))
}

impl AdapterDescriptor {
    /// Whether the adapter's executable can be found
    #[must_use]
    pub fn is_available(&self) -> bool {
        locate(self.command).is_some()
    }
}

/// An adapter ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAdapter {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Resolves an adapter value to something launchable
///
/// # Errors
/// Returns an error if:
/// - No value is given, or the value is `none` ([`GtrError::Usage`])
/// - The command cannot be found ([`GtrError::NotFound`])
pub fn resolve(kind: AdapterKind, value: Option<&str>) -> Result<ResolvedAdapter> {
    let value = value.map(str::trim).filter(|v| !v.is_empty() && *v != "none");
    let Some(value) = value else {
        return Err(GtrError::usage(format!(
            "no {} configured (set {} or pass {})",
            kind,
            kind.config_key(),
            kind.flag()
        ))
        .into());
    };

    let mut words = value.split_whitespace();
    let head = words.next().unwrap_or(value);
    let extra: Vec<String> = words.map(str::to_string).collect();

    let (name, command, mut args) = match find_builtin(kind, head) {
        Some(builtin) => (
            builtin.name.to_string(),
            builtin.command,
            builtin.args.iter().map(|a| (*a).to_string()).collect::<Vec<_>>(),
        ),
        None => (head.to_string(), head, Vec::new()),
    };
    args.extend(extra);

    let program = locate(command).ok_or_else(|| GtrError::NotFound {
        what: if kind == AdapterKind::Editor {
            "editor command"
        } else {
            "AI tool command"
        },
        name: command.to_string(),
    })?;

    tracing::debug!(%kind, name = %name, program = %program.display(), ?args, "resolved adapter");
    Ok(ResolvedAdapter {
        name,
        program,
        args,
    })
}

/// Finds `command` on `PATH`, accepting absolute paths as-is. Claude Code's
/// local install location is checked as well.
fn locate(command: &str) -> Option<PathBuf> {
    if Path::new(command).is_absolute() {
        return Path::new(command).is_file().then(|| PathBuf::from(command));
    }
    if let Ok(path) = which::which(command) {
        return Some(path);
    }
    if command == "claude" {
        let local = dirs::home_dir()?.join(".claude").join("local").join("claude");
        if local.is_file() {
            return Some(local);
        }
    }
    None
}

impl ResolvedAdapter {
    /// Opens `path` in the editor and waits for it to exit
    ///
    /// # Errors
    /// Returns an error if the editor cannot be spawned or exits non-zero
    pub fn open_editor(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to launch editor '{}'", self.name))?;

        if !status.success() {
            anyhow::bail!(
                "editor '{}' exited with status {}",
                self.name,
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }

    /// Runs the AI tool inside `path` with `extra` appended, returning its
    /// exit code
    ///
    /// # Errors
    /// Returns an error if the tool cannot be spawned
    pub fn run_ai(&self, path: &Path, extra: &[String]) -> Result<i32> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .current_dir(path)
            .status()
            .with_context(|| format!("Failed to launch AI tool '{}'", self.name))?;
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_cover_both_kinds() {
        let editors: Vec<_> = builtins(AdapterKind::Editor).map(|a| a.name).collect();
        let ais: Vec<_> = builtins(AdapterKind::Ai).map(|a| a.name).collect();
        assert_eq!(editors.len(), 13);
        assert_eq!(ais.len(), 9);
        assert!(editors.contains(&"vscode"));
        assert!(ais.contains(&"claude"));
    }

    #[test]
    fn cursor_means_different_commands_per_kind() {
        assert_eq!(
            find_builtin(AdapterKind::Editor, "cursor").map(|a| a.command),
            Some("cursor")
        );
        assert_eq!(
            find_builtin(AdapterKind::Ai, "cursor").map(|a| a.command),
            Some("cursor-agent")
        );
    }

    #[test]
    fn none_and_missing_values_are_usage_errors() {
        for value in [None, Some("none"), Some("  ")] {
            let err = resolve(AdapterKind::Editor, value).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<GtrError>(),
                Some(GtrError::Usage(_))
            ));
        }
    }

    #[test]
    fn generic_command_on_path_keeps_its_arguments() -> Result<()> {
        let adapter = resolve(AdapterKind::Editor, Some("sh -x --norc"))?;
        assert_eq!(adapter.name, "sh");
        assert_eq!(adapter.args, vec!["-x".to_string(), "--norc".to_string()]);
        Ok(())
    }

    #[test]
    fn unknown_command_is_not_found() {
        let err = resolve(AdapterKind::Ai, Some("gtr-no-such-tool-xyz")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GtrError>(),
            Some(GtrError::NotFound { .. })
        ));
    }

    #[test]
    fn ai_exit_code_is_returned() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let adapter = resolve(AdapterKind::Ai, Some("sh -c"))?;
        let code = adapter.run_ai(dir.path(), &["exit 7".to_string()])?;
        assert_eq!(code, 7);
        Ok(())
    }
}
