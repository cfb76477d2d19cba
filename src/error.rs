//! Typed errors that map to distinct process exit codes.
//!
//! Most failures in gtr are plain [`anyhow::Error`]s with context attached.
//! The variants here are the ones callers (and scripts) need to tell apart,
//! so `main` downcasts to [`GtrError`] to pick an exit code.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit code for usage errors, matching clap's own parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Exit code for every other failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum GtrError {
    /// Bad arguments or an operation that makes no sense for its target
    #[error("{0}")]
    Usage(String),

    /// A config key outside the `gtr.*` namespace gtr understands
    #[error("unknown config key '{key}' (run `git gtr config list --keys` to see valid keys)")]
    UnknownKey { key: String },

    /// The branch already exists (with a worktree at `path` if one is known)
    #[error("branch '{branch}' already exists{}", worktree_suffix(path.as_deref()))]
    BranchExists {
        branch: String,
        path: Option<PathBuf>,
    },

    /// An identifier, branch or ref that could not be resolved
    #[error("{what} '{name}' not found")]
    NotFound { what: &'static str, name: String },

    /// `git fetch` failed and fetching was not skipped
    #[error("failed to fetch from '{remote}': {message} (use --no-fetch to skip)")]
    Fetch { remote: String, message: String },
}

impl GtrError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn worktree_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            what: "worktree",
            name: name.into(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

fn worktree_suffix(path: Option<&Path>) -> String {
    path.map(|p| format!(" (worktree at {})", p.display()))
        .unwrap_or_default()
}

/// Picks the exit code for an error that reached `main`.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<GtrError>()
        .map_or(EXIT_FAILURE, GtrError::exit_code)
}
