//! Test support utilities for gtr integration tests
//!
//! Builds throw-away repositories (with a bare `origin`) and runs the real
//! `git-gtr` binary against them with an isolated global config.

pub mod patterns;
pub mod test_env;

pub use patterns::{assert_local_files_copied, create_local_files, write_shared_config};
pub use test_env::CliTestEnvironment;
