//! Command implementations for repo-cli

pub mod cat;
pub mod get;
pub mod stat;
pub mod walk;

pub use cat::run_cat;
pub use get::run_get;
pub use stat::{run_resolve, run_stat};
pub use walk::{run_ls, run_walk};

use repo_fs::NormalizedPath;
use repo_tree::RepoTree;

/// `path` relative to the tree root for display; `.` for the root itself.
pub(crate) fn display_path(tree: &RepoTree, path: &NormalizedPath) -> String {
    match path.strip_prefix(tree.root()) {
        Some("") => ".".to_string(),
        Some(rel) => rel.to_string(),
        None => path.to_string(),
    }
}
