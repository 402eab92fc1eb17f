//! Version-control handles for repo-tree
//!
//! A working tree is either a git checkout or a plain directory. Both expose
//! the same [`Scm`] handle, which subprojects inherit from their parent.

pub mod error;
pub mod git;
pub mod scm;

pub use error::{Error, Result};
pub use git::GitScm;
pub use scm::{PlainScm, Scm, ScmKind};

use repo_fs::NormalizedPath;
use std::sync::Arc;

/// Detect the version control covering `path`.
///
/// Falls back to a [`PlainScm`] rooted at `path` when no git checkout
/// encloses it.
pub fn detect(path: &NormalizedPath) -> Arc<dyn Scm> {
    match GitScm::discover(path) {
        Ok(git) => {
            tracing::debug!(root = %git.root(), "detected git checkout");
            Arc::new(git)
        }
        Err(_) => {
            tracing::debug!(root = %path, "no version control detected");
            Arc::new(PlainScm::new(path.clone()))
        }
    }
}
