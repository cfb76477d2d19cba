//! Team-shared defaults committed to the repository as `.gtr.toml`.
//!
//! Values here sit between the repository-local git config and the user's
//! global git config, so a team can ship copy patterns and hooks while each
//! developer can still override them locally.
//!
//! ```toml
//! [editor]
//! default = "cursor"
//!
//! [worktrees]
//! dir = "../my-repo-worktrees"
//! default-branch = "main"
//!
//! [copy]
//! include = [".env*", "**/.env.local"]
//! include-dirs = ["node_modules"]
//!
//! [hook]
//! post-create = ["npm install"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::ConfigKey;

pub const SHARED_CONFIG_FILE: &str = ".gtr.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedConfig {
    pub editor: DefaultSection,
    pub ai: DefaultSection,
    pub worktrees: WorktreesSection,
    pub copy: CopySection,
    pub hook: HookSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSection {
    pub default: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorktreesSection {
    pub dir: Option<String>,
    pub prefix: Option<String>,
    pub default_branch: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CopySection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HookSection {
    pub post_create: Vec<String>,
    pub pre_remove: Vec<String>,
    pub post_remove: Vec<String>,
}

/// Outcome of reading `.gtr.toml`: the parsed file plus any syntax error that
/// made us fall back to an empty one.
#[derive(Debug, Default)]
pub struct LoadedShared {
    pub config: SharedConfig,
    pub parse_error: Option<String>,
}

impl SharedConfig {
    /// Loads `.gtr.toml` from the repository root.
    ///
    /// A missing or blank file yields an empty config. Invalid TOML is logged
    /// and ignored so a broken team file never blocks local work.
    ///
    /// # Errors
    /// Only returns an error if the file exists but cannot be read
    pub fn load(repo_root: &Path) -> Result<LoadedShared> {
        let path = repo_root.join(SHARED_CONFIG_FILE);

        if !path.exists() {
            return Ok(LoadedShared::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(LoadedShared::default());
        }

        match toml::from_str::<SharedConfig>(&content) {
            Ok(config) => Ok(LoadedShared {
                config,
                parse_error: None,
            }),
            Err(e) => {
                tracing::warn!("ignoring invalid {}: {}", SHARED_CONFIG_FILE, e);
                Ok(LoadedShared {
                    config: SharedConfig::default(),
                    parse_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Values this file provides for `key`, in file order.
    #[must_use]
    pub fn values(&self, key: ConfigKey) -> Vec<String> {
        let single = |value: &Option<String>| value.iter().cloned().collect::<Vec<_>>();
        match key {
            ConfigKey::EditorDefault => single(&self.editor.default),
            ConfigKey::AiDefault => single(&self.ai.default),
            ConfigKey::WorktreesDir => single(&self.worktrees.dir),
            ConfigKey::WorktreesPrefix => single(&self.worktrees.prefix),
            ConfigKey::WorktreesDefaultBranch => single(&self.worktrees.default_branch),
            ConfigKey::CopyInclude => self.copy.include.clone(),
            ConfigKey::CopyExclude => self.copy.exclude.clone(),
            ConfigKey::CopyIncludeDirs => self.copy.include_dirs.clone(),
            ConfigKey::CopyExcludeDirs => self.copy.exclude_dirs.clone(),
            ConfigKey::HookPostCreate => self.hook.post_create.clone(),
            ConfigKey::HookPreRemove => self.hook.pre_remove.clone(),
            ConfigKey::HookPostRemove => self.hook.post_remove.clone(),
        }
    }
}
