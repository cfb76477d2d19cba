use anyhow::{Context, Result};
use git2::{BranchType, ErrorCode, Repository, StatusOptions, WorktreeLockStatus};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::GtrError;

pub const DEFAULT_REMOTE: &str = "origin";

/// What a worktree's HEAD points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch(String),
    Detached(String),
    Unknown,
}

impl Head {
    /// Parses the contents of a `HEAD` file.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let content = content.trim();
        if let Some(reference) = content.strip_prefix("ref: ") {
            let branch = reference
                .strip_prefix("refs/heads/")
                .unwrap_or(reference)
                .to_string();
            Head::Branch(branch)
        } else if !content.is_empty() {
            Head::Detached(content.to_string())
        } else {
            Head::Unknown
        }
    }

    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match self {
            Head::Branch(name) => Some(name),
            Head::Detached(_) | Head::Unknown => None,
        }
    }
}

/// A linked worktree as git records it under `.git/worktrees/<name>`.
#[derive(Debug, Clone)]
pub struct LinkedWorktree {
    pub name: String,
    pub path: PathBuf,
    pub head: Head,
    pub locked: bool,
}

impl LinkedWorktree {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        !self.path.exists()
    }
}

/// The repository gtr operates on, always opened at its main checkout even
/// when invoked from inside a linked worktree.
pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
    current_branch: Option<String>,
}

impl GitRepo {
    /// Discovers the repository containing `path`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The path is not inside a git repository
    /// - The repository is bare
    pub fn discover(path: &Path) -> Result<Self> {
        let discovered = Repository::discover(path).context("Failed to find git repository")?;

        let current_branch = head_branch(&discovered);

        let repo = if discovered.is_worktree() {
            Repository::open(discovered.commondir())
                .context("Failed to open main repository of this worktree")?
        } else {
            discovered
        };

        let root = repo
            .workdir()
            .map(normalize)
            .ok_or_else(|| GtrError::usage("bare repositories are not supported"))?;

        tracing::debug!(root = %root.display(), "opened repository");

        Ok(Self {
            repo,
            root,
            current_branch,
        })
    }

    #[must_use]
    pub fn raw(&self) -> &Repository {
        &self.repo
    }

    /// Working directory of the main checkout
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Branch checked out where the command was invoked
    #[must_use]
    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }

    /// Branch checked out in the main checkout
    #[must_use]
    pub fn main_branch(&self) -> Option<String> {
        head_branch(&self.repo)
    }

    /// Checks if a local branch exists in the repository
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        match self.repo.find_branch(branch_name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks if `<remote>/<branch>` exists as a remote-tracking branch
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn remote_branch_exists(&self, remote: &str, branch_name: &str) -> Result<bool> {
        let name = format!("{}/{}", remote, branch_name);
        match self.repo.find_branch(&name, BranchType::Remote) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn has_remote(&self, remote: &str) -> bool {
        self.repo.find_remote(remote).is_ok()
    }

    /// Fetches `remote` with the git binary so credential helpers apply
    ///
    /// # Errors
    /// Returns [`GtrError::Fetch`] if git fails or cannot be run
    pub fn fetch(&self, remote: &str) -> Result<(), GtrError> {
        tracing::info!(remote, "fetching");
        let output = run_git(&["fetch", "--quiet", remote], &self.root).map_err(|e| {
            GtrError::Fetch {
                remote: remote.to_string(),
                message: e.to_string(),
            }
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(GtrError::Fetch {
                remote: remote.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Branch new branches should start from.
    ///
    /// Uses `configured` when given, then `origin/HEAD`, then `main` or
    /// `master`, then whatever the main checkout has checked out.
    #[must_use]
    pub fn default_branch(&self, configured: Option<&str>) -> String {
        if let Some(branch) = configured {
            return branch.to_string();
        }

        let origin_head = format!("refs/remotes/{}/HEAD", DEFAULT_REMOTE);
        if let Ok(reference) = self.repo.find_reference(&origin_head) {
            if let Some(target) = reference.symbolic_target() {
                let prefix = format!("refs/remotes/{}/", DEFAULT_REMOTE);
                if let Some(branch) = target.strip_prefix(&prefix) {
                    return branch.to_string();
                }
            }
        }

        for candidate in ["main", "master"] {
            if matches!(self.branch_exists(candidate), Ok(true)) {
                return candidate.to_string();
            }
        }

        self.main_branch().unwrap_or_else(|| "main".to_string())
    }

    /// Resolves a git reference (branch, tag, commit) to a commit object
    ///
    /// # Errors
    /// Returns an error if:
    /// - The reference cannot be found
    /// - The reference cannot be resolved to a commit
    pub fn resolve_reference(&self, reference: &str) -> Result<git2::Commit<'_>> {
        let obj = self
            .repo
            .revparse_single(reference)
            .map_err(|_| GtrError::NotFound {
                what: "reference",
                name: reference.to_string(),
            })?;
        obj.peel_to_commit()
            .with_context(|| format!("Reference '{}' does not point to a commit", reference))
    }

    /// Creates a local branch at `from_ref`
    ///
    /// # Errors
    /// Returns an error if the ref cannot be resolved or the branch exists
    pub fn create_branch(&self, branch_name: &str, from_ref: &str) -> Result<()> {
        let commit = self.resolve_reference(from_ref)?;
        self.repo
            .branch(branch_name, &commit, false)
            .with_context(|| format!("Failed to create branch '{}'", branch_name))?;
        tracing::debug!(branch_name, from_ref, "created branch");
        Ok(())
    }

    /// Makes `branch` track `<remote>/<branch>`, creating it at the remote
    /// tip if it doesn't exist yet. An existing local branch keeps its tip.
    ///
    /// # Errors
    /// Returns an error if the remote branch is missing or git operations fail
    pub fn create_tracking_branch(&self, branch_name: &str, remote: &str) -> Result<()> {
        let upstream = format!("{}/{}", remote, branch_name);
        if !self.branch_exists(branch_name)? {
            let commit = self.resolve_reference(&upstream)?;
            self.repo
                .branch(branch_name, &commit, false)
                .with_context(|| format!("Failed to create branch '{}'", branch_name))?;
        }

        let mut branch = self.repo.find_branch(branch_name, BranchType::Local)?;
        branch
            .set_upstream(Some(upstream.as_str()))
            .with_context(|| format!("Failed to set upstream of '{}' to {}", branch_name, upstream))?;
        tracing::debug!(branch_name, %upstream, "tracking branch ready");
        Ok(())
    }

    /// Registers a worktree named `name` at `path` with `branch_name` checked
    /// out. With `force`, the branch may already be checked out elsewhere.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The branch doesn't exist
    /// - A worktree with that name is still registered
    /// - Git operations fail
    pub fn add_worktree(
        &self,
        name: &str,
        path: &Path,
        branch_name: &str,
        force: bool,
    ) -> Result<()> {
        // A registration whose directory was deleted by hand blocks the name.
        if let Ok(stale) = self.repo.find_worktree(name) {
            if stale.validate().is_err() {
                tracing::debug!(name, "pruning stale worktree registration");
                stale.prune(Some(git2::WorktreePruneOptions::new().valid(false)))?;
            }
        }

        if force {
            let path_str = path.to_string_lossy();
            let output = run_git(
                &["worktree", "add", "--force", &path_str, branch_name],
                &self.root,
            )?;
            if !output.status.success() {
                anyhow::bail!(
                    "git worktree add failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            return Ok(());
        }

        let branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .with_context(|| format!("Failed to find branch '{}'", branch_name))?;

        let mut opts = git2::WorktreeAddOptions::new();
        opts.reference(Some(branch.get()));

        self.repo
            .worktree(name, path, Some(&opts))
            .with_context(|| format!("Failed to create worktree at {}", path.display()))?;

        Ok(())
    }

    /// Lists linked worktrees (the main checkout is not included)
    ///
    /// # Errors
    /// Returns an error if git operations fail
    pub fn worktrees(&self) -> Result<Vec<LinkedWorktree>> {
        let names = self.repo.worktrees()?;
        let mut worktrees = Vec::new();

        for name in names.iter().flatten() {
            let worktree = match self.repo.find_worktree(name) {
                Ok(worktree) => worktree,
                Err(e) => {
                    tracing::warn!(name, "skipping unreadable worktree: {}", e);
                    continue;
                }
            };

            let head_file = self.repo.path().join("worktrees").join(name).join("HEAD");
            let head = std::fs::read_to_string(&head_file)
                .map(|content| Head::parse(&content))
                .unwrap_or(Head::Unknown);

            worktrees.push(LinkedWorktree {
                name: name.to_string(),
                path: normalize(worktree.path()),
                head,
                locked: matches!(worktree.is_locked(), Ok(WorktreeLockStatus::Locked(_))),
            });
        }

        Ok(worktrees)
    }

    /// Deletes a worktree's directory and its registration in git
    ///
    /// # Errors
    /// Returns an error if git operations or directory removal fail
    pub fn remove_worktree(&self, name: &str, path: &Path) -> Result<()> {
        let worktree = self.repo.find_worktree(name)?;
        worktree.prune(Some(
            git2::WorktreePruneOptions::new()
                .valid(true)
                .locked(true)
                .working_tree(true),
        ))?;

        if path.exists() {
            std::fs::remove_dir_all(path)
                .with_context(|| format!("Failed to remove directory {}", path.display()))?;
        }
        tracing::debug!(name, path = %path.display(), "removed worktree");
        Ok(())
    }

    /// Deletes a local branch
    ///
    /// # Errors
    /// Returns an error if:
    /// - Branch doesn't exist
    /// - Git operations fail
    pub fn delete_branch(&self, branch_name: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(branch_name, BranchType::Local)?;
        branch.delete()?;
        Ok(())
    }

    /// Whether the checkout at `path` has uncommitted or untracked changes
    ///
    /// # Errors
    /// Returns an error if the checkout cannot be opened
    pub fn is_dirty(path: &Path) -> Result<bool> {
        let repo = Repository::open(path)
            .with_context(|| format!("Failed to open worktree at {}", path.display()))?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);
        let statuses = repo.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    /// Whether `branch_name` is fully merged into `target`, i.e. its tip is
    /// a strict ancestor of `target`. A branch sitting exactly on `target`
    /// has nothing of its own yet and counts as unmerged.
    ///
    /// # Errors
    /// Returns an error if either ref cannot be resolved
    pub fn is_merged(&self, branch_name: &str, target: &str) -> Result<bool> {
        let branch = self.resolve_reference(&format!("refs/heads/{}", branch_name))?.id();
        let target = self.resolve_reference(target)?.id();
        if branch == target {
            return Ok(false);
        }
        Ok(self.repo.graph_descendant_of(target, branch)?)
    }
}

/// Runs the git binary in `cwd`, capturing its output
///
/// # Errors
/// Returns an error if git cannot be spawned
pub fn run_git(args: &[&str], cwd: &Path) -> Result<Output> {
    tracing::debug!(?args, cwd = %cwd.display(), "running git");
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .context("Failed to execute git command")
}

fn head_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(str::to_string)
    } else {
        None
    }
}

/// Drops trailing separators so paths compare and print consistently.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
