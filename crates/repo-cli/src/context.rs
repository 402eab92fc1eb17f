//! Project root detection
//!
//! Commands work from anywhere inside a project: the root is the nearest
//! ancestor of the working directory holding a `.artifacts` marker.

use repo_fs::{NormalizedPath, RepoPath};

/// Nearest ancestor of `cwd` (inclusive) that is a project root.
pub fn find_project_root(cwd: &NormalizedPath) -> Option<NormalizedPath> {
    cwd.ancestors()
        .find(|dir| dir.join(RepoPath::ManagedDir.as_str()).is_dir())
}

/// Root to open: an explicit `--root`, else the enclosing project, else `cwd`.
pub fn resolve_root(explicit: Option<&str>, cwd: &NormalizedPath) -> NormalizedPath {
    match explicit {
        Some(root) => cwd.join(root),
        None => find_project_root(cwd).unwrap_or_else(|| cwd.clone()),
    }
}
