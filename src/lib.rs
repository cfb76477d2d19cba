//! # gtr
//!
//! `git gtr` manages extra git worktrees for a repository: one folder per
//! branch under a predictable directory, with local files copied in and
//! lifecycle hooks run around creation and removal.
//!
//! ```bash
//! git gtr new feature/auth          # create ../my-repo-worktrees/feature-auth
//! cd "$(git gtr go feature/auth)"   # jump to it
//! git gtr run feature/auth npm test # run something inside it
//! git gtr editor feature/auth       # open it in the configured editor
//! git gtr rm feature/auth           # remove it again
//! ```
//!
//! ## Module Structure
//!
//! - [`commands`] - One module per subcommand
//! - [`worktree`] - Creating, resolving, listing, removing and cleaning worktrees
//! - [`config`] - `gtr.*` settings in git config and `.gtr.toml`
//! - [`adapters`] - Editor and AI-tool launchers
//! - [`hooks`] - Post-create / pre-remove / post-remove shell hooks
//! - [`git`] - Git operations wrapper using the git2 crate
//! - [`prompt`] - Confirmation prompts, abstracted for tests
//! - [`error`] - Typed errors and exit codes

pub mod adapters;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod hooks;
pub mod logging;
pub mod prompt;
pub mod worktree;

#[cfg(test)]
pub(crate) mod test_repo;

pub use anyhow::Result;
