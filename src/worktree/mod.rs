//! Worktree lifecycle: create, resolve, list, remove, clean.
//!
//! Identifiers accepted wherever a worktree is expected:
//!
//! - `1`, the main checkout (always resolves)
//! - a branch name (`feature/auth`)
//! - a folder name under the worktrees directory (`feature-auth`)

pub mod copy;
mod layout;

pub use layout::{Layout, sanitize};

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, Settings};
use crate::error::GtrError;
use crate::git::{DEFAULT_REMOTE, GitRepo, Head, LinkedWorktree};
use crate::hooks::{HookContext, HookPoint, HookReport, run_hooks};

/// Reserved identifier for the main checkout.
pub const MAIN_ID: &str = "1";

/// How `new` finds or creates the branch to check out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TrackMode {
    /// Local branch, else remote branch, else a new branch
    #[default]
    Auto,
    /// Track `origin/<branch>`
    Remote,
    /// Use an existing local branch
    Local,
    /// Always start a new branch without upstream
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Ok,
    Missing,
    Detached,
    Locked,
}

impl EntryStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Ok => "ok",
            EntryStatus::Missing => "missing",
            EntryStatus::Detached => "detached",
            EntryStatus::Locked => "locked",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    /// Identifier shown to users: `1` for the main checkout, else the branch
    /// (or folder name when detached)
    pub id: String,
    /// Git's registration name (the folder name); empty for the main checkout
    pub name: String,
    pub path: PathBuf,
    pub branch: Option<String>,
    pub status: EntryStatus,
    pub is_main: bool,
}

impl WorktreeEntry {
    fn from_linked(linked: LinkedWorktree) -> Self {
        let status = if linked.is_missing() {
            EntryStatus::Missing
        } else if linked.locked {
            EntryStatus::Locked
        } else if linked.head.branch().is_none() {
            EntryStatus::Detached
        } else {
            EntryStatus::Ok
        };
        let branch = linked.head.branch().map(str::to_string);
        Self {
            id: branch.clone().unwrap_or_else(|| linked.name.clone()),
            name: linked.name,
            path: linked.path,
            branch,
            status,
            is_main: false,
        }
    }

    fn hook_context(&self, repo_root: &Path) -> HookContext {
        HookContext {
            repo_root: repo_root.to_path_buf(),
            worktree_path: self.path.clone(),
            branch: self.branch.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub folder: Option<String>,
    pub name: Option<String>,
    pub from: Option<String>,
    pub from_current: bool,
    pub track: TrackMode,
    pub no_copy: bool,
    pub no_fetch: bool,
    pub force: bool,
}

/// Where the checked-out branch of a new worktree came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOrigin {
    Existing,
    Tracking(String),
    Created { from: String },
}

#[derive(Debug)]
pub struct Created {
    pub entry: WorktreeEntry,
    pub origin: BranchOrigin,
    pub copied: copy::CopyReport,
    pub hooks: HookReport,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    pub delete_branch: bool,
    pub force: bool,
}

#[derive(Debug, Default)]
pub struct Removed {
    /// `Some(Err(msg))` when branch deletion was requested but failed
    pub branch_deleted: Option<std::result::Result<String, String>>,
    pub hooks: HookReport,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    pub merged: bool,
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanReason {
    DirectoryMissing,
    BranchDeleted,
    Merged,
}

impl fmt::Display for CleanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CleanReason::DirectoryMissing => "directory missing",
            CleanReason::BranchDeleted => "branch deleted",
            CleanReason::Merged => "branch merged",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct CleanCandidate {
    pub entry: WorktreeEntry,
    pub reason: CleanReason,
}

/// Everything needed to operate on the worktrees of one repository.
pub struct WorktreeManager {
    git: GitRepo,
    config: ConfigStore,
    settings: Settings,
    layout: Layout,
}

impl WorktreeManager {
    /// Opens the repository containing `start` with its settings
    ///
    /// # Errors
    /// Returns an error if:
    /// - `start` is not inside a non-bare git repository
    /// - Config cannot be read
    pub fn discover(start: &Path) -> Result<Self> {
        let git = GitRepo::discover(start)?;
        let config = ConfigStore::open(git.raw(), git.root())?;
        let settings = config.settings()?;
        let layout = Layout::new(
            git.root(),
            settings.worktrees_dir.as_deref(),
            &settings.prefix,
        )?;

        Ok(Self {
            git,
            config,
            settings,
            layout,
        })
    }

    #[must_use]
    pub fn git(&self) -> &GitRepo {
        &self.git
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn main_entry(&self) -> WorktreeEntry {
        let branch = self.git.main_branch();
        WorktreeEntry {
            id: MAIN_ID.to_string(),
            name: String::new(),
            path: self.git.root().to_path_buf(),
            status: if branch.is_some() {
                EntryStatus::Ok
            } else {
                EntryStatus::Detached
            },
            branch,
            is_main: true,
        }
    }

    /// Main checkout first, then linked worktrees sorted by path
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn list(&self) -> Result<Vec<WorktreeEntry>> {
        let mut linked: Vec<WorktreeEntry> = self
            .git
            .worktrees()?
            .into_iter()
            .map(WorktreeEntry::from_linked)
            .collect();
        linked.sort_by(|a, b| a.path.cmp(&b.path));

        let mut entries = vec![self.main_entry()];
        entries.extend(linked);
        Ok(entries)
    }

    /// Maps an identifier to a known worktree, including ones whose
    /// directory has gone missing
    ///
    /// # Errors
    /// Returns [`GtrError::NotFound`] if nothing matches
    pub fn resolve(&self, id: &str) -> Result<WorktreeEntry> {
        let id = id.trim();
        if id == MAIN_ID {
            return Ok(self.main_entry());
        }

        let entries = self.list()?;

        if let Some(entry) = entries
            .iter()
            .find(|e| e.branch.as_deref() == Some(id))
        {
            return Ok(entry.clone());
        }

        let derived = self.layout.folder_name(id, None, None);
        if let Some(entry) = entries.iter().find(|e| {
            !e.is_main
                && (e.name == id
                    || e.name == derived
                    || e.path.file_name().is_some_and(|f| f == id))
        }) {
            return Ok(entry.clone());
        }

        Err(GtrError::worktree_not_found(id).into())
    }

    /// Like [`resolve`](Self::resolve) but only for worktrees that exist on
    /// disk
    ///
    /// # Errors
    /// Returns [`GtrError::NotFound`] if nothing matches or the directory is
    /// gone
    pub fn resolve_existing(&self, id: &str) -> Result<WorktreeEntry> {
        let entry = self.resolve(id)?;
        if entry.path.exists() {
            Ok(entry)
        } else {
            tracing::info!(path = %entry.path.display(), "worktree directory missing; run `git gtr clean`");
            Err(GtrError::worktree_not_found(id).into())
        }
    }

    /// Creates a worktree for `branch`
    ///
    /// When copying files or starting the postCreate hooks fails, the new
    /// worktree and any branch created for it are removed again.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The branch name is invalid ([`GtrError::Usage`])
    /// - Fetching fails ([`GtrError::Fetch`])
    /// - The branch already has a worktree ([`GtrError::BranchExists`])
    /// - A required local/remote branch or base ref is missing
    ///   ([`GtrError::NotFound`])
    /// - Git or filesystem operations fail
    pub fn create(&self, branch: &str, opts: &CreateOptions) -> Result<Created> {
        let branch = branch.trim();
        if branch == MAIN_ID || !git2::Branch::name_is_valid(branch).unwrap_or(false) {
            return Err(GtrError::usage(format!("'{}' is not a valid branch name", branch)).into());
        }

        if !opts.no_fetch && self.git.has_remote(DEFAULT_REMOTE) {
            self.git.fetch(DEFAULT_REMOTE)?;
        }

        let folder = self
            .layout
            .folder_name(branch, opts.folder.as_deref(), opts.name.as_deref());
        let path = self.layout.worktree_path(&folder);

        let checked_out_at = self.checked_out_at(branch)?;
        if let Some(existing) = &checked_out_at {
            if !opts.force {
                return Err(GtrError::BranchExists {
                    branch: branch.to_string(),
                    path: Some(existing.clone()),
                }
                .into());
            }
        }
        if path.exists() {
            return Err(GtrError::BranchExists {
                branch: branch.to_string(),
                path: Some(path),
            }
            .into());
        }

        let origin = self.prepare_branch(branch, opts)?;

        std::fs::create_dir_all(self.layout.base_dir()).with_context(|| {
            format!(
                "Failed to create worktrees directory: {}",
                self.layout.base_dir().display()
            )
        })?;

        tracing::info!(branch, path = %path.display(), "creating worktree");
        if let Err(e) =
            self.git
                .add_worktree(&folder, &path, branch, checked_out_at.is_some())
        {
            self.discard_branch(branch, &origin);
            return Err(e);
        }

        let entry = WorktreeEntry {
            id: branch.to_string(),
            name: folder,
            path,
            branch: Some(branch.to_string()),
            status: EntryStatus::Ok,
            is_main: false,
        };

        match self.populate(&entry, opts) {
            Ok((copied, hooks)) => Ok(Created {
                entry,
                origin,
                copied,
                hooks,
            }),
            Err(e) => {
                tracing::warn!(path = %entry.path.display(), "rolling back worktree: {:#}", e);
                if let Err(cleanup) = self.git.remove_worktree(&entry.name, &entry.path) {
                    tracing::warn!("could not remove {}: {:#}", entry.path.display(), cleanup);
                }
                self.discard_branch(branch, &origin);
                Err(e)
            }
        }
    }

    /// Copies local files into a freshly added worktree and runs the
    /// postCreate hooks there.
    fn populate(
        &self,
        entry: &WorktreeEntry,
        opts: &CreateOptions,
    ) -> Result<(copy::CopyReport, HookReport)> {
        let copied = if opts.no_copy || self.settings.copy.is_empty() {
            copy::CopyReport::default()
        } else {
            copy::copy_into_worktree(self.git.root(), &entry.path, &self.settings.copy)?
        };

        let hooks = run_hooks(
            HookPoint::PostCreate,
            self.settings.hooks(HookPoint::PostCreate),
            &entry.hook_context(self.git.root()),
        )?;

        Ok((copied, hooks))
    }

    /// Deletes `branch` if `create` made it.
    fn discard_branch(&self, branch: &str, origin: &BranchOrigin) {
        if !matches!(origin, BranchOrigin::Created { .. }) {
            return;
        }
        if let Err(e) = self.git.delete_branch(branch) {
            tracing::warn!(branch, "could not delete branch: {:#}", e);
        }
    }

    /// Where `branch` is already checked out, if anywhere
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn checked_out_at(&self, branch: &str) -> Result<Option<PathBuf>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|e| e.branch.as_deref() == Some(branch))
            .map(|e| e.path))
    }

    fn prepare_branch(&self, branch: &str, opts: &CreateOptions) -> Result<BranchOrigin> {
        let local = self.git.branch_exists(branch)?;
        let remote = self.git.remote_branch_exists(DEFAULT_REMOTE, branch)?;
        let upstream = format!("{}/{}", DEFAULT_REMOTE, branch);

        match opts.track {
            TrackMode::Auto if local => Ok(BranchOrigin::Existing),
            TrackMode::Auto if remote => {
                self.git.create_tracking_branch(branch, DEFAULT_REMOTE)?;
                Ok(BranchOrigin::Tracking(upstream))
            }
            TrackMode::Remote => {
                if !remote {
                    return Err(GtrError::NotFound {
                        what: "remote branch",
                        name: upstream,
                    }
                    .into());
                }
                self.git.create_tracking_branch(branch, DEFAULT_REMOTE)?;
                Ok(BranchOrigin::Tracking(upstream))
            }
            TrackMode::Local => {
                if local {
                    Ok(BranchOrigin::Existing)
                } else {
                    Err(GtrError::NotFound {
                        what: "local branch",
                        name: branch.to_string(),
                    }
                    .into())
                }
            }
            TrackMode::None if local => {
                if opts.force {
                    Ok(BranchOrigin::Existing)
                } else {
                    Err(GtrError::BranchExists {
                        branch: branch.to_string(),
                        path: None,
                    }
                    .into())
                }
            }
            TrackMode::Auto | TrackMode::None => {
                let from = self.base_ref(opts)?;
                self.git.create_branch(branch, &from)?;
                Ok(BranchOrigin::Created { from })
            }
        }
    }

    fn base_ref(&self, opts: &CreateOptions) -> Result<String> {
        if let Some(from) = &opts.from {
            return Ok(from.clone());
        }
        if opts.from_current {
            return self
                .git
                .current_branch()
                .map(str::to_string)
                .ok_or_else(|| {
                    GtrError::usage("--from-current needs a checked-out branch (HEAD is detached)")
                        .into()
                });
        }
        Ok(self.default_base_ref())
    }

    /// `origin/<default>` when it exists, else `<default>`.
    #[must_use]
    pub fn default_base_ref(&self) -> String {
        let default = self
            .git
            .default_branch(self.settings.default_branch.as_deref());
        if matches!(
            self.git.remote_branch_exists(DEFAULT_REMOTE, &default),
            Ok(true)
        ) {
            format!("{}/{}", DEFAULT_REMOTE, default)
        } else {
            default
        }
    }

    /// Removes one worktree, running the remove hooks around it
    ///
    /// # Errors
    /// Returns an error if:
    /// - `entry` is the main checkout or locked without `force`
    /// - A pre-remove hook fails without `force`
    /// - The worktree is dirty without `force`
    /// - Git or filesystem operations fail
    pub fn remove(&self, entry: &WorktreeEntry, opts: &RemoveOptions) -> Result<Removed> {
        if entry.is_main {
            return Err(GtrError::usage("the main checkout cannot be removed").into());
        }
        if entry.status == EntryStatus::Locked && !opts.force {
            return Err(GtrError::usage(format!(
                "worktree '{}' is locked (use --force to remove it anyway)",
                entry.id
            ))
            .into());
        }

        let ctx = entry.hook_context(self.git.root());

        if entry.path.exists() {
            let pre = run_hooks(
                HookPoint::PreRemove,
                self.settings.hooks(HookPoint::PreRemove),
                &ctx,
            )?;
            if let Some(failure) = pre.failures.first() {
                if !opts.force {
                    anyhow::bail!(
                        "preRemove hook {} (use --force to remove anyway)",
                        failure
                    );
                }
                tracing::warn!("preRemove hook {}; removing anyway", failure);
            }

            if !opts.force && GitRepo::is_dirty(&entry.path)? {
                return Err(GtrError::usage(format!(
                    "worktree '{}' has uncommitted changes (use --force to remove it anyway)",
                    entry.id
                ))
                .into());
            }
        }

        self.git.remove_worktree(&entry.name, &entry.path)?;

        let branch_deleted = match (&entry.branch, opts.delete_branch) {
            (Some(branch), true) => Some(
                self.git
                    .delete_branch(branch)
                    .map(|()| branch.clone())
                    .map_err(|e| e.to_string()),
            ),
            _ => None,
        };

        let hooks = run_hooks(
            HookPoint::PostRemove,
            self.settings.hooks(HookPoint::PostRemove),
            &ctx,
        )?;

        Ok(Removed {
            branch_deleted,
            hooks,
        })
    }

    /// Worktrees that `clean` would remove
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn clean_candidates(&self, opts: &CleanOptions) -> Result<Vec<CleanCandidate>> {
        let default_ref = self.default_base_ref();
        let default_branch = self
            .git
            .default_branch(self.settings.default_branch.as_deref());
        let mut candidates = Vec::new();

        for linked in self.git.worktrees()? {
            let missing = linked.is_missing();
            let head = linked.head.clone();
            let entry = WorktreeEntry::from_linked(linked);

            if entry.status == EntryStatus::Locked && !opts.force {
                continue;
            }

            let reason = if missing {
                Some(CleanReason::DirectoryMissing)
            } else if let Head::Branch(branch) = &head {
                if !self.git.branch_exists(branch)? {
                    Some(CleanReason::BranchDeleted)
                } else if opts.merged
                    && *branch != default_branch
                    && self.git.is_merged(branch, &default_ref).unwrap_or(false)
                {
                    Some(CleanReason::Merged)
                } else {
                    None
                }
            } else {
                None
            };

            if let Some(reason) = reason {
                candidates.push(CleanCandidate { entry, reason });
            }
        }

        Ok(candidates)
    }

    /// Removes one clean candidate. Returns `false` when it was skipped
    /// because it has local changes.
    ///
    /// # Errors
    /// Returns an error if git or filesystem operations fail
    pub fn clean_one(&self, candidate: &CleanCandidate, force: bool) -> Result<bool> {
        let entry = &candidate.entry;
        if candidate.reason != CleanReason::DirectoryMissing
            && !force
            && GitRepo::is_dirty(&entry.path).unwrap_or(false)
        {
            return Ok(false);
        }

        self.git.remove_worktree(&entry.name, &entry.path)?;

        if candidate.reason == CleanReason::Merged {
            if let Some(branch) = &entry.branch {
                if let Err(e) = self.git.delete_branch(branch) {
                    tracing::warn!(branch = %branch, "could not delete merged branch: {}", e);
                }
            }
        }
        Ok(true)
    }

    /// Empty directories directly under the worktrees directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read
    pub fn empty_dirs(&self) -> Result<Vec<PathBuf>> {
        let base = self.layout.base_dir();
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut empty = Vec::new();
        for entry in std::fs::read_dir(base)? {
            let path = entry?.path();
            if path.is_dir() && std::fs::read_dir(&path)?.next().is_none() {
                empty.push(path);
            }
        }
        empty.sort();
        Ok(empty)
    }
}
