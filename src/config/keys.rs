use std::fmt;
use std::str::FromStr;

use crate::error::GtrError;

/// Every `gtr.*` key gtr reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    EditorDefault,
    AiDefault,
    WorktreesDir,
    WorktreesPrefix,
    WorktreesDefaultBranch,
    CopyInclude,
    CopyExclude,
    CopyIncludeDirs,
    CopyExcludeDirs,
    HookPostCreate,
    HookPreRemove,
    HookPostRemove,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 12] = [
        ConfigKey::EditorDefault,
        ConfigKey::AiDefault,
        ConfigKey::WorktreesDir,
        ConfigKey::WorktreesPrefix,
        ConfigKey::WorktreesDefaultBranch,
        ConfigKey::CopyInclude,
        ConfigKey::CopyExclude,
        ConfigKey::CopyIncludeDirs,
        ConfigKey::CopyExcludeDirs,
        ConfigKey::HookPostCreate,
        ConfigKey::HookPreRemove,
        ConfigKey::HookPostRemove,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::EditorDefault => "gtr.editor.default",
            ConfigKey::AiDefault => "gtr.ai.default",
            ConfigKey::WorktreesDir => "gtr.worktrees.dir",
            ConfigKey::WorktreesPrefix => "gtr.worktrees.prefix",
            ConfigKey::WorktreesDefaultBranch => "gtr.worktrees.defaultBranch",
            ConfigKey::CopyInclude => "gtr.copy.include",
            ConfigKey::CopyExclude => "gtr.copy.exclude",
            ConfigKey::CopyIncludeDirs => "gtr.copy.includeDirs",
            ConfigKey::CopyExcludeDirs => "gtr.copy.excludeDirs",
            ConfigKey::HookPostCreate => "gtr.hook.postCreate",
            ConfigKey::HookPreRemove => "gtr.hook.preRemove",
            ConfigKey::HookPostRemove => "gtr.hook.postRemove",
        }
    }

    /// Multi-valued keys hold an ordered list (`config add` appends to them).
    #[must_use]
    pub fn is_multi(self) -> bool {
        matches!(
            self,
            ConfigKey::CopyInclude
                | ConfigKey::CopyExclude
                | ConfigKey::CopyIncludeDirs
                | ConfigKey::CopyExcludeDirs
                | ConfigKey::HookPostCreate
                | ConfigKey::HookPreRemove
                | ConfigKey::HookPostRemove
        )
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ConfigKey::EditorDefault => "Editor adapter used by `editor`",
            ConfigKey::AiDefault => "AI tool adapter used by `ai`",
            ConfigKey::WorktreesDir => "Base directory for worktrees",
            ConfigKey::WorktreesPrefix => "Prefix added to worktree folder names",
            ConfigKey::WorktreesDefaultBranch => "Branch new branches start from",
            ConfigKey::CopyInclude => "Glob patterns of files copied into new worktrees",
            ConfigKey::CopyExclude => "Glob patterns never copied",
            ConfigKey::CopyIncludeDirs => "Directories copied recursively into new worktrees",
            ConfigKey::CopyExcludeDirs => "Directory globs skipped while copying",
            ConfigKey::HookPostCreate => "Commands run after a worktree is created",
            ConfigKey::HookPreRemove => "Commands run before a worktree is removed",
            ConfigKey::HookPostRemove => "Commands run after a worktree is removed",
        }
    }

    /// Parses a dotted key. Matching ignores case, like git does.
    ///
    /// # Errors
    /// Returns [`GtrError::UnknownKey`] for anything outside the known set
    pub fn parse(key: &str) -> Result<Self, GtrError> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(key))
            .ok_or_else(|| GtrError::UnknownKey {
                key: key.to_string(),
            })
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = GtrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
