//! Copies untracked local files (env files, editor settings, dependency
//! directories) from the main checkout into a freshly created worktree.

use anyhow::{Context, Result};
use glob::Pattern;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::CopyPatterns;

#[derive(Debug, Default)]
pub struct CopyReport {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

impl CopyReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// Compiled exclude rules. A trailing `/` excludes a directory prefix;
/// anything else is a glob matched against the relative path.
struct Excludes {
    prefixes: Vec<String>,
    globs: Vec<Pattern>,
}

impl Excludes {
    fn compile(patterns: &[String]) -> Result<Self> {
        let mut prefixes = Vec::new();
        let mut globs = Vec::new();
        for pattern in patterns {
            if pattern.ends_with('/') {
                prefixes.push(pattern.clone());
            } else {
                globs.push(
                    Pattern::new(pattern)
                        .with_context(|| format!("Invalid copy pattern '{}'", pattern))?,
                );
            }
        }
        Ok(Self { prefixes, globs })
    }

    fn matches(&self, relative: &Path) -> bool {
        let rel = to_slash(relative);
        self.prefixes
            .iter()
            .any(|p| rel.starts_with(p.as_str()) || rel == p.trim_end_matches('/'))
            || self.globs.iter().any(|g| g.matches(&rel))
    }
}

/// Copies everything `patterns` selects from `source_root` to `target_root`.
///
/// Files already present in the target (tracked files from the checkout)
/// are left alone.
///
/// # Errors
/// Returns an error if a pattern is invalid or a copy fails
pub fn copy_into_worktree(
    source_root: &Path,
    target_root: &Path,
    patterns: &CopyPatterns,
) -> Result<CopyReport> {
    let excludes = Excludes::compile(&patterns.exclude)?;
    let exclude_dirs = Excludes::compile(&patterns.exclude_dirs)?;
    let mut report = CopyReport::default();

    for pattern in &patterns.include {
        for source in find_matching(source_root, pattern)? {
            let relative = source.strip_prefix(source_root)?.to_path_buf();
            if excludes.matches(&relative) {
                tracing::debug!(path = %relative.display(), "excluded from copy");
                continue;
            }

            if source.is_file() {
                if copy_file(&source, &target_root.join(&relative))? {
                    report.files.push(relative);
                }
            } else if source.is_dir() {
                copy_dir_recursive(source_root, &source, target_root, &excludes, &exclude_dirs)?;
                report.dirs.push(relative);
            }
        }
    }

    for pattern in &patterns.include_dirs {
        for source in find_matching(source_root, pattern)? {
            if !source.is_dir() {
                continue;
            }
            let relative = source.strip_prefix(source_root)?.to_path_buf();
            if exclude_dirs.matches(&relative) {
                continue;
            }
            copy_dir_recursive(source_root, &source, target_root, &excludes, &exclude_dirs)?;
            report.dirs.push(relative);
        }
    }

    Ok(report)
}

fn find_matching(base_path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !is_safe_relative(pattern) {
        tracing::warn!(pattern, "ignoring copy pattern outside the repository");
        return Ok(Vec::new());
    }

    let full = format!(
        "{}/{}",
        Pattern::escape(&base_path.to_string_lossy()),
        pattern.trim_end_matches('/')
    );

    let mut matches = Vec::new();
    for entry in glob::glob(&full).with_context(|| format!("Invalid copy pattern '{}'", pattern))? {
        let path = entry?;
        let inside_git = path
            .strip_prefix(base_path)
            .map(|rel| rel.components().any(|c| c.as_os_str() == ".git"))
            .unwrap_or(true);
        if !inside_git {
            matches.push(path);
        }
    }
    Ok(matches)
}

fn is_safe_relative(pattern: &str) -> bool {
    let path = Path::new(pattern);
    !pattern.is_empty()
        && !path.is_absolute()
        && !path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Returns whether the file was copied.
fn copy_file(source: &Path, target: &Path) -> Result<bool> {
    if target.exists() {
        return Ok(false);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target).with_context(|| format!("Failed to copy {}", source.display()))?;
    Ok(true)
}

/// Recreates the link at `source` with the same (possibly relative)
/// target. Returns whether a link was created.
fn copy_symlink(source: &Path, target: &Path) -> Result<bool> {
    if target.symlink_metadata().is_ok() {
        return Ok(false);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let link = fs::read_link(source)
        .with_context(|| format!("Failed to read link {}", source.display()))?;

    #[cfg(unix)]
    let created = std::os::unix::fs::symlink(&link, target);
    #[cfg(windows)]
    let created = if source.is_dir() {
        std::os::windows::fs::symlink_dir(&link, target)
    } else {
        std::os::windows::fs::symlink_file(&link, target)
    };

    created.with_context(|| format!("Failed to copy link {}", source.display()))?;
    Ok(true)
}

fn copy_dir_recursive(
    source_root: &Path,
    source: &Path,
    target_root: &Path,
    excludes: &Excludes,
    exclude_dirs: &Excludes,
) -> Result<()> {
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let relative = path.strip_prefix(source_root)?;

        if entry.file_name() == ".git" {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            // Recreate links instead of following them.
            if !exclude_dirs.matches(relative) && !excludes.matches(relative) {
                copy_symlink(&path, &target_root.join(relative))?;
            }
        } else if file_type.is_dir() {
            if exclude_dirs.matches(relative) || excludes.matches(relative) {
                continue;
            }
            copy_dir_recursive(source_root, &path, target_root, excludes, exclude_dirs)?;
        } else if !excludes.matches(relative) {
            copy_file(&path, &target_root.join(relative))?;
        }
    }
    Ok(())
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
