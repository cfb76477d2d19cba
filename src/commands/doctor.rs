//! `git gtr doctor`: reports on the setup without ever failing.

use std::fmt;
use std::path::Path;

use crate::adapters::{self, AdapterKind};
use crate::git::DEFAULT_REMOTE;
use crate::hooks::HookPoint;
use crate::worktree::{EntryStatus, WorktreeManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Info,
    Warning,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_issue(&self) -> bool {
        matches!(self.status, CheckStatus::Warning | CheckStatus::Fail)
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.status {
            CheckStatus::Pass => "✓",
            CheckStatus::Info => "·",
            CheckStatus::Warning => "⚠",
            CheckStatus::Fail => "✗",
        };
        write!(f, "{} {}", mark, self.message)
    }
}

/// Prints every check and a summary line
pub fn run_doctor(start: &Path) {
    let results = run_checks(start);
    for result in &results {
        println!("{}", result);
    }

    let issues = results.iter().filter(|r| r.is_issue()).count();
    println!();
    if issues == 0 {
        println!("Everything looks good.");
    } else {
        println!("{} issue(s) found.", issues);
    }
}

#[must_use]
pub fn run_checks(start: &Path) -> Vec<CheckResult> {
    let mut results = vec![check_git_binary()];

    let manager = match WorktreeManager::discover(start) {
        Ok(manager) => manager,
        Err(e) => {
            results.push(CheckResult::new(
                CheckStatus::Fail,
                format!("Not in a usable git repository: {:#}", e),
            ));
            return results;
        }
    };

    let git = manager.git();
    results.push(CheckResult::new(
        CheckStatus::Pass,
        format!("Repository: {}", git.root().display()),
    ));
    results.push(CheckResult::new(
        CheckStatus::Info,
        format!(
            "Current branch: {}",
            git.current_branch().unwrap_or("(detached)")
        ),
    ));

    results.push(if git.has_remote(DEFAULT_REMOTE) {
        CheckResult::new(CheckStatus::Pass, format!("Remote '{}' configured", DEFAULT_REMOTE))
    } else {
        CheckResult::new(
            CheckStatus::Info,
            format!("No '{}' remote; fetching is skipped", DEFAULT_REMOTE),
        )
    });

    results.push(check_base_dir(&manager));
    results.push(check_adapter(AdapterKind::Editor, manager.settings().editor.as_deref()));
    results.push(check_adapter(AdapterKind::Ai, manager.settings().ai.as_deref()));

    match manager.list() {
        Ok(entries) => {
            let linked = entries.iter().filter(|e| !e.is_main).count();
            let missing = entries
                .iter()
                .filter(|e| e.status == EntryStatus::Missing)
                .count();
            results.push(CheckResult::new(
                CheckStatus::Info,
                format!("{} linked worktree(s)", linked),
            ));
            if missing > 0 {
                results.push(CheckResult::new(
                    CheckStatus::Warning,
                    format!(
                        "{} worktree(s) have missing directories (run `git gtr clean`)",
                        missing
                    ),
                ));
            }
        }
        Err(e) => results.push(CheckResult::new(
            CheckStatus::Fail,
            format!("Failed to list worktrees: {:#}", e),
        )),
    }

    let settings = manager.settings();
    results.push(CheckResult::new(
        CheckStatus::Info,
        format!(
            "Hooks: {} {}, {} {}, {} {}",
            HookPoint::PostCreate,
            settings.hooks(HookPoint::PostCreate).len(),
            HookPoint::PreRemove,
            settings.hooks(HookPoint::PreRemove).len(),
            HookPoint::PostRemove,
            settings.hooks(HookPoint::PostRemove).len(),
        ),
    ));

    if let Some(error) = manager.config().shared_error() {
        results.push(CheckResult::new(
            CheckStatus::Fail,
            format!("Ignoring invalid .gtr.toml: {}", error),
        ));
    }

    results
}

fn check_git_binary() -> CheckResult {
    match which::which("git") {
        Ok(path) => CheckResult::new(CheckStatus::Pass, format!("git: {}", path.display())),
        Err(_) => CheckResult::new(CheckStatus::Fail, "git not found on PATH"),
    }
}

fn check_base_dir(manager: &WorktreeManager) -> CheckResult {
    let base = manager.layout().base_dir();
    if base.starts_with(manager.git().root()) {
        return CheckResult::new(
            CheckStatus::Warning,
            format!(
                "Worktrees directory {} is inside the repository; make sure it is ignored",
                base.display()
            ),
        );
    }
    if base.is_dir() {
        CheckResult::new(
            CheckStatus::Pass,
            format!("Worktrees directory: {}", base.display()),
        )
    } else {
        CheckResult::new(
            CheckStatus::Info,
            format!("Worktrees directory: {} (created on first use)", base.display()),
        )
    }
}

fn check_adapter(kind: AdapterKind, value: Option<&str>) -> CheckResult {
    let label = match kind {
        AdapterKind::Editor => "Editor",
        AdapterKind::Ai => "AI tool",
    };
    let Some(value) = value else {
        return CheckResult::new(CheckStatus::Info, format!("{}: not configured", label));
    };
    match adapters::resolve(kind, Some(value)) {
        Ok(adapter) => CheckResult::new(
            CheckStatus::Pass,
            format!("{}: {} ({})", label, adapter.name, adapter.program.display()),
        ),
        Err(e) => CheckResult::new(CheckStatus::Fail, format!("{}: {}", label, e)),
    }
}
