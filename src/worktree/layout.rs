use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Where worktrees of one repository live and how their folders are named.
///
/// Default layout puts worktrees next to the repository:
///
/// ```text
/// ~/code/my-repo/                      main checkout
/// ~/code/my-repo-worktrees/feature-x/  worktree for feature/x
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    base_dir: PathBuf,
    prefix: String,
}

impl Layout {
    /// Builds the layout for the checkout at `repo_root`.
    ///
    /// `configured_dir` is `gtr.worktrees.dir`: `~/` expands to the home
    /// directory and relative paths are taken from the repository root.
    ///
    /// # Errors
    /// Returns an error if `~/` is used and no home directory is known
    pub fn new(repo_root: &Path, configured_dir: Option<&str>, prefix: &str) -> Result<Self> {
        let base_dir = match configured_dir {
            Some(dir) => expand_dir(repo_root, dir)?,
            None => default_base_dir(repo_root),
        };

        Ok(Self {
            base_dir,
            prefix: sanitize(prefix),
        })
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Folder name for `branch`: prefix + sanitized branch, with an optional
    /// `-<suffix>`. An explicit `folder` replaces the derived name entirely.
    #[must_use]
    pub fn folder_name(&self, branch: &str, folder: Option<&str>, suffix: Option<&str>) -> String {
        if let Some(folder) = folder {
            return sanitize(folder);
        }
        let mut name = format!("{}{}", self.prefix, sanitize(branch));
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            name.push('-');
            name.push_str(&sanitize(suffix));
        }
        name
    }

    #[must_use]
    pub fn worktree_path(&self, folder_name: &str) -> PathBuf {
        self.base_dir.join(folder_name)
    }
}

/// Replaces characters that are unsafe in a single path component.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '-',
            c => c,
        })
        .collect()
}

fn default_base_dir(repo_root: &Path) -> PathBuf {
    let name = repo_root
        .file_name()
        .map_or_else(|| "repo".to_string(), |n| n.to_string_lossy().to_string());
    let parent = repo_root.parent().unwrap_or(repo_root);
    parent.join(format!("{}-worktrees", name))
}

fn expand_dir(repo_root: &Path, dir: &str) -> Result<PathBuf> {
    if dir == "~" || dir.starts_with("~/") {
        let home = dirs::home_dir().context("Failed to get user home directory")?;
        let rest = dir.trim_start_matches('~').trim_start_matches('/');
        return Ok(if rest.is_empty() { home } else { resolve_dots(&home.join(rest)) });
    }

    let path = Path::new(dir);
    if path.is_absolute() {
        Ok(resolve_dots(path))
    } else {
        Ok(resolve_dots(&repo_root.join(path)))
    }
}

/// Folds `.` and `..` components without touching the filesystem, so
/// `/code/repo/../trees` becomes `/code/trees`.
fn resolve_dots(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match resolved.components().next_back() {
                Some(Component::Normal(_)) => {
                    resolved.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => resolved.push(".."),
            },
            other => resolved.push(other),
        }
    }
    resolved
}
