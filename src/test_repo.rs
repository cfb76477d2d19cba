//! Throw-away repositories for unit tests that need real worktrees.

use anyhow::Result;
use git2::{Repository, RepositoryInitOptions, Signature};
use std::path::PathBuf;

use crate::config::GLOBAL_CONFIG_ENV;
use crate::worktree::{CreateOptions, WorktreeManager};

/// A repository with one empty commit on `main` and its own global config
/// file, deleted on drop.
pub struct TestRepo {
    _dir: tempfile::TempDir,
    root: PathBuf,
    global: PathBuf,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().join("repo");

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(&root, &opts)?;
        let sig = Signature::now("Test User", "test@example.com")?;
        let tree_id = repo.index()?.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])?;

        let global = dir.path().join("global.gitconfig");
        Ok(Self {
            _dir: dir,
            root,
            global,
        })
    }

    pub fn manager(&self) -> Result<WorktreeManager> {
        temp_env::with_var(
            GLOBAL_CONFIG_ENV,
            Some(self.global.to_string_lossy().to_string()),
            || WorktreeManager::discover(&self.root),
        )
    }

    /// Creates a worktree for `branch` without fetching and returns its path
    pub fn add_worktree(manager: &WorktreeManager, branch: &str) -> Result<PathBuf> {
        let opts = CreateOptions {
            no_fetch: true,
            ..CreateOptions::default()
        };
        Ok(manager.create(branch, &opts)?.entry.path)
    }
    /// Adds an empty commit on top of the main checkout's branch
    pub fn commit_on_main(manager: &WorktreeManager) -> Result<()> {
        let repo = manager.git().raw();
        let sig = Signature::now("Test User", "test@example.com")?;
        let parent = repo.head()?.peel_to_commit()?;
        let tree = parent.tree()?;
        repo.commit(Some("HEAD"), &sig, &sig, "More work", &tree, &[&parent])?;
        Ok(())
    }
}
