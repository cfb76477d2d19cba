//! Per-repository settings stored in git's own config files.
//!
//! Keys live under `gtr.*` and are read with this precedence:
//!
//! 1. Repository-local git config (`git config gtr.editor.default cursor`)
//! 2. Team-shared `.gtr.toml` at the repository root
//! 3. User-level git config (`~/.gitconfig`, or `$GTR_GLOBAL_CONFIG`)
//!
//! Single-valued keys take the first layer that sets them. Multi-valued keys
//! (copy patterns and hooks) are the ordered union of all layers.
//!
//! | Key | Kind |
//! |-----|------|
//! | `gtr.editor.default` | single |
//! | `gtr.ai.default` | single |
//! | `gtr.worktrees.dir` | single |
//! | `gtr.worktrees.prefix` | single |
//! | `gtr.worktrees.defaultBranch` | single |
//! | `gtr.copy.include` / `exclude` / `includeDirs` / `excludeDirs` | multi |
//! | `gtr.hook.postCreate` / `preRemove` / `postRemove` | multi |

mod keys;
mod shared;

pub use keys::ConfigKey;
pub use shared::{SHARED_CONFIG_FILE, SharedConfig};

use anyhow::{Context, Result};
use git2::{Config, ConfigLevel, ErrorCode};
use std::path::{Path, PathBuf};

use crate::error::GtrError;
use crate::hooks::HookPoint;

/// Environment variable that redirects the user-level store to another file.
pub const GLOBAL_CONFIG_ENV: &str = "GTR_GLOBAL_CONFIG";

/// Matches no stored value, so `set_multivar` appends instead of replacing.
const APPEND_REGEX: &str = "^$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    Global,
}

impl Scope {
    #[must_use]
    pub fn from_global_flag(global: bool) -> Self {
        if global { Scope::Global } else { Scope::Local }
    }
}

/// Read/write access to the `gtr.*` keys of one repository, or only the
/// user-level keys when opened outside a repository.
pub struct ConfigStore {
    local: Option<Config>,
    global: Config,
    shared: SharedConfig,
    shared_error: Option<String>,
}

impl ConfigStore {
    /// Opens the stores for `repo`, whose main checkout is `repo_root`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The repository config cannot be opened
    /// - The global config location cannot be determined
    /// - `.gtr.toml` exists but cannot be read
    pub fn open(repo: &git2::Repository, repo_root: &Path) -> Result<Self> {
        let local = repo
            .config()
            .context("Failed to get repository config")?
            .open_level(ConfigLevel::Local)
            .context("Failed to open repository-local config")?;

        let loaded = SharedConfig::load(repo_root)?;

        Ok(Self {
            local: Some(local),
            global: open_global_config()?,
            shared: loaded.config,
            shared_error: loaded.parse_error,
        })
    }

    /// Opens only the user-level store. Works outside any repository;
    /// local-scope access then fails.
    ///
    /// # Errors
    /// Returns an error if the global config cannot be located or opened
    pub fn open_global() -> Result<Self> {
        Ok(Self {
            local: None,
            global: open_global_config()?,
            shared: SharedConfig::default(),
            shared_error: None,
        })
    }

    /// Syntax error in `.gtr.toml`, if the file was ignored because of one.
    #[must_use]
    pub fn shared_error(&self) -> Option<&str> {
        self.shared_error.as_deref()
    }

    fn store(&self, scope: Scope) -> Result<&Config> {
        match scope {
            Scope::Local => self.local.as_ref().ok_or_else(no_local_store),
            Scope::Global => Ok(&self.global),
        }
    }

    fn store_mut(&mut self, scope: Scope) -> Result<&mut Config> {
        match scope {
            Scope::Local => self.local.as_mut().ok_or_else(no_local_store),
            Scope::Global => Ok(&mut self.global),
        }
    }

    fn local_values(&self, key: ConfigKey) -> Result<Vec<String>> {
        match &self.local {
            Some(local) => read_values(local, key),
            None => Ok(Vec::new()),
        }
    }

    /// Effective single value of `key` across all layers.
    ///
    /// # Errors
    /// Returns an error if git config cannot be read
    pub fn get(&self, key: ConfigKey) -> Result<Option<String>> {
        if let Some(value) = self.local_values(key)?.pop() {
            return Ok(Some(value));
        }
        if let Some(value) = self.shared.values(key).pop() {
            return Ok(Some(value));
        }
        Ok(read_values(&self.global, key)?.pop())
    }

    /// Effective values of `key`: the ordered, de-duplicated union of layers.
    ///
    /// # Errors
    /// Returns an error if git config cannot be read
    pub fn get_all(&self, key: ConfigKey) -> Result<Vec<String>> {
        let mut merged: Vec<String> = Vec::new();
        let layers = [
            self.local_values(key)?,
            self.shared.values(key),
            read_values(&self.global, key)?,
        ];
        for value in layers.into_iter().flatten() {
            if !merged.contains(&value) {
                merged.push(value);
            }
        }
        Ok(merged)
    }

    /// Values of `key` stored in exactly one scope.
    ///
    /// # Errors
    /// Returns an error if git config cannot be read
    pub fn get_scoped(&self, key: ConfigKey, scope: Scope) -> Result<Vec<String>> {
        read_values(self.store(scope)?, key)
    }

    /// Replaces every value of `key` in `scope` with `value`.
    ///
    /// # Errors
    /// Returns an error if git config cannot be written
    pub fn set(&mut self, key: ConfigKey, value: &str, scope: Scope) -> Result<()> {
        tracing::debug!(key = key.as_str(), ?scope, "config set");
        let store = self.store_mut(scope)?;
        clear(store, key)?;
        store
            .set_str(key.as_str(), value)
            .with_context(|| format!("Failed to set {}", key))?;
        Ok(())
    }

    /// Appends `value` to the multi-valued `key` in `scope`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `key` is single-valued or `value` is empty
    /// - git config cannot be written
    pub fn add(&mut self, key: ConfigKey, value: &str, scope: Scope) -> Result<()> {
        if !key.is_multi() {
            return Err(GtrError::usage(format!(
                "{} holds a single value; use `config set` instead",
                key
            ))
            .into());
        }
        if value.is_empty() {
            return Err(GtrError::usage("cannot add an empty value").into());
        }
        tracing::debug!(key = key.as_str(), ?scope, "config add");
        self.store_mut(scope)?
            .set_multivar(key.as_str(), APPEND_REGEX, value)
            .with_context(|| format!("Failed to add to {}", key))?;
        Ok(())
    }

    /// Removes every value of `key` from `scope`. Returns whether anything
    /// was removed.
    ///
    /// # Errors
    /// Returns an error if git config cannot be written
    pub fn unset(&mut self, key: ConfigKey, scope: Scope) -> Result<bool> {
        tracing::debug!(key = key.as_str(), ?scope, "config unset");
        clear(self.store_mut(scope)?, key)
    }

    /// All keys with at least one effective value, in declaration order.
    ///
    /// # Errors
    /// Returns an error if git config cannot be read
    pub fn list(&self, scope: Option<Scope>) -> Result<Vec<(ConfigKey, Vec<String>)>> {
        let mut entries = Vec::new();
        for key in ConfigKey::ALL {
            let values = match scope {
                Some(scope) => self.get_scoped(key, scope)?,
                None if key.is_multi() => self.get_all(key)?,
                None => self.get(key)?.into_iter().collect(),
            };
            if !values.is_empty() {
                entries.push((key, values));
            }
        }
        Ok(entries)
    }

    /// Typed view of every setting gtr uses.
    ///
    /// # Errors
    /// Returns an error if git config cannot be read
    pub fn settings(&self) -> Result<Settings> {
        let adapter = |key: ConfigKey| -> Result<Option<String>> {
            Ok(self
                .get(key)?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != "none"))
        };

        Ok(Settings {
            editor: adapter(ConfigKey::EditorDefault)?,
            ai: adapter(ConfigKey::AiDefault)?,
            worktrees_dir: self.get(ConfigKey::WorktreesDir)?.filter(|v| !v.is_empty()),
            prefix: self.get(ConfigKey::WorktreesPrefix)?.unwrap_or_default(),
            default_branch: self
                .get(ConfigKey::WorktreesDefaultBranch)?
                .filter(|v| !v.is_empty()),
            copy: CopyPatterns {
                include: self.get_all(ConfigKey::CopyInclude)?,
                exclude: self.get_all(ConfigKey::CopyExclude)?,
                include_dirs: self.get_all(ConfigKey::CopyIncludeDirs)?,
                exclude_dirs: self.get_all(ConfigKey::CopyExcludeDirs)?,
            },
            post_create: self.get_all(ConfigKey::HookPostCreate)?,
            pre_remove: self.get_all(ConfigKey::HookPreRemove)?,
            post_remove: self.get_all(ConfigKey::HookPostRemove)?,
        })
    }
}

/// Resolves where the user-level store lives.
///
/// # Errors
/// Returns an error if no home directory can be determined
pub fn global_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(GLOBAL_CONFIG_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    if let Ok(path) = Config::find_global() {
        return Ok(path);
    }
    Ok(dirs::home_dir()
        .context("Failed to get user home directory")?
        .join(".gitconfig"))
}

fn open_global_config() -> Result<Config> {
    let path = global_config_path()?;
    Config::open(&path)
        .with_context(|| format!("Failed to open global config: {}", path.display()))
}

fn no_local_store() -> anyhow::Error {
    GtrError::usage("not inside a git repository (pass --global to use the user-level config)")
        .into()
}

fn read_values(config: &Config, key: ConfigKey) -> Result<Vec<String>> {
    let mut values = Vec::new();
    let mut entries = match config.multivar(key.as_str(), None) {
        Ok(entries) => entries,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(values),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", key)),
    };

    while let Some(entry_result) = entries.next() {
        let entry = entry_result.with_context(|| format!("Failed to read {}", key))?;
        if let Some(value) = entry.value() {
            values.push(value.to_string());
        }
    }

    Ok(values)
}

fn clear(config: &mut Config, key: ConfigKey) -> Result<bool> {
    match config.remove_multivar(key.as_str(), ".*") {
        Ok(()) => Ok(true),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to unset {}", key)),
    }
}

/// Copy pattern lists used when populating a new worktree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPatterns {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_dirs: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

impl CopyPatterns {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.include_dirs.is_empty()
    }
}

/// Effective settings for one repository.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub editor: Option<String>,
    pub ai: Option<String>,
    pub worktrees_dir: Option<String>,
    pub prefix: String,
    pub default_branch: Option<String>,
    pub copy: CopyPatterns,
    pub post_create: Vec<String>,
    pub pre_remove: Vec<String>,
    pub post_remove: Vec<String>,
}

impl Settings {
    #[must_use]
    pub fn hooks(&self, point: HookPoint) -> &[String] {
        match point {
            HookPoint::PostCreate => &self.post_create,
            HookPoint::PreRemove => &self.pre_remove,
            HookPoint::PostRemove => &self.post_remove,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        repo: git2::Repository,
        root: PathBuf,
        global: PathBuf,
    }

    fn fixture() -> Result<Fixture> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("repo");
        let repo = git2::Repository::init(&root)?;
        let global = dir.path().join("global.gitconfig");
        Ok(Fixture {
            _dir: dir,
            repo,
            root,
            global,
        })
    }

    fn open(f: &Fixture) -> Result<ConfigStore> {
        temp_env::with_var(
            GLOBAL_CONFIG_ENV,
            Some(f.global.to_string_lossy().to_string()),
            || ConfigStore::open(&f.repo, &f.root),
        )
    }

    #[test]
    fn set_then_get_round_trips() -> Result<()> {
        let f = fixture()?;
        let mut store = open(&f)?;
        store.set(ConfigKey::EditorDefault, "cursor", Scope::Local)?;
        assert_eq!(store.get(ConfigKey::EditorDefault)?.as_deref(), Some("cursor"));

        store.set(ConfigKey::EditorDefault, "zed", Scope::Local)?;
        assert_eq!(store.get(ConfigKey::EditorDefault)?.as_deref(), Some("zed"));
        Ok(())
    }

    #[test]
    fn add_is_cumulative_and_ordered() -> Result<()> {
        let f = fixture()?;
        let mut store = open(&f)?;
        for pattern in [".env", "*.local.json", ".vscode/**"] {
            store.add(ConfigKey::CopyInclude, pattern, Scope::Local)?;
        }
        assert_eq!(
            store.get_all(ConfigKey::CopyInclude)?,
            vec![".env", "*.local.json", ".vscode/**"]
        );
        Ok(())
    }

    #[test]
    fn set_replaces_all_values_of_multi_key() -> Result<()> {
        let f = fixture()?;
        let mut store = open(&f)?;
        store.add(ConfigKey::HookPostCreate, "echo a", Scope::Local)?;
        store.add(ConfigKey::HookPostCreate, "echo b", Scope::Local)?;
        store.set(ConfigKey::HookPostCreate, "echo c", Scope::Local)?;
        assert_eq!(store.get_all(ConfigKey::HookPostCreate)?, vec!["echo c"]);
        Ok(())
    }

    #[test]
    fn add_rejects_single_valued_keys() -> Result<()> {
        let f = fixture()?;
        let mut store = open(&f)?;
        let err = store
            .add(ConfigKey::AiDefault, "claude", Scope::Local)
            .err()
            .map(|e| e.to_string());
        assert!(err.is_some_and(|m| m.contains("single value")));
        Ok(())
    }

    #[test]
    fn unset_reports_whether_anything_was_removed() -> Result<()> {
        let f = fixture()?;
        let mut store = open(&f)?;
        assert!(!store.unset(ConfigKey::WorktreesDir, Scope::Local)?);
        store.set(ConfigKey::WorktreesDir, "../wt", Scope::Local)?;
        assert!(store.unset(ConfigKey::WorktreesDir, Scope::Local)?);
        assert_eq!(store.get(ConfigKey::WorktreesDir)?, None);
        Ok(())
    }

    #[test]
    fn local_beats_shared_beats_global() -> Result<()> {
        let f = fixture()?;
        fs::write(
            f.root.join(SHARED_CONFIG_FILE),
            "[ai]\ndefault = \"aider\"\n[copy]\ninclude = [\"shared\"]\n",
        )?;
        let mut store = open(&f)?;
        store.set(ConfigKey::AiDefault, "codex", Scope::Global)?;
        store.add(ConfigKey::CopyInclude, "global", Scope::Global)?;
        store.add(ConfigKey::CopyInclude, "local", Scope::Local)?;

        assert_eq!(store.get(ConfigKey::AiDefault)?.as_deref(), Some("aider"));
        assert_eq!(
            store.get_all(ConfigKey::CopyInclude)?,
            vec!["local", "shared", "global"]
        );

        store.set(ConfigKey::AiDefault, "claude", Scope::Local)?;
        assert_eq!(store.get(ConfigKey::AiDefault)?.as_deref(), Some("claude"));
        assert_eq!(
            store.get_scoped(ConfigKey::AiDefault, Scope::Global)?,
            vec!["codex"]
        );
        Ok(())
    }

    #[test]
    fn settings_treat_none_as_unset() -> Result<()> {
        let f = fixture()?;
        let mut store = open(&f)?;
        store.set(ConfigKey::EditorDefault, "none", Scope::Local)?;
        store.add(ConfigKey::HookPreRemove, "make stop", Scope::Local)?;

        let settings = store.settings()?;
        assert_eq!(settings.editor, None);
        assert_eq!(settings.hooks(HookPoint::PreRemove), ["make stop"]);
        assert!(settings.hooks(HookPoint::PostCreate).is_empty());
        Ok(())
    }

    #[test]
    fn global_only_store_rejects_local_scope() -> Result<()> {
        let f = fixture()?;
        let mut store = temp_env::with_var(
            GLOBAL_CONFIG_ENV,
            Some(f.global.to_string_lossy().to_string()),
            ConfigStore::open_global,
        )?;

        store.set(ConfigKey::EditorDefault, "vim", Scope::Global)?;
        assert_eq!(store.get(ConfigKey::EditorDefault)?.as_deref(), Some("vim"));

        let err = store
            .set(ConfigKey::EditorDefault, "zed", Scope::Local)
            .err()
            .and_then(|e| e.downcast::<GtrError>().ok());
        assert!(matches!(err, Some(GtrError::Usage(_))));
        Ok(())
    }
}
