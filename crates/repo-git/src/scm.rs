//! Version-control handle shared between a project and its subprojects

use crate::Result;
use repo_fs::NormalizedPath;

/// Kind of version control backing a working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScmKind {
    Git,
    Plain,
}

impl std::fmt::Display for ScmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// Trait for the version-control view of a working tree.
///
/// A subproject nested inside a checkout shares its parent's handle: both
/// live in the same repository and see the same revision.
pub trait Scm: Send + Sync + std::fmt::Debug {
    /// Top of the checkout
    fn root(&self) -> &NormalizedPath;

    /// Which backend this is
    fn kind(&self) -> ScmKind;

    /// The checked-out revision, or `None` when there is no history yet
    /// (or no version control at all).
    fn revision(&self) -> Result<Option<String>>;
}

/// A directory that is not under version control.
#[derive(Debug, Clone)]
pub struct PlainScm {
    root: NormalizedPath,
}

impl PlainScm {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }
}

impl Scm for PlainScm {
    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn kind(&self) -> ScmKind {
        ScmKind::Plain
    }

    fn revision(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
