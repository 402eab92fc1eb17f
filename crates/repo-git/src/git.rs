//! Git-backed version-control handle

use crate::{
    Error, Result,
    scm::{Scm, ScmKind},
};
use git2::{ErrorCode, Repository};
use repo_fs::NormalizedPath;

/// A checkout managed by git.
///
/// The repository is reopened per query; `git2::Repository` is not `Sync`
/// and queries are rare.
#[derive(Debug, Clone)]
pub struct GitScm {
    root: NormalizedPath,
}

impl GitScm {
    /// Open the git checkout whose working directory is `root`.
    pub fn open(root: NormalizedPath) -> Result<Self> {
        let repo = Repository::open(root.to_native()).map_err(|_| Error::NotARepository {
            path: root.to_native(),
        })?;
        if repo.is_bare() {
            return Err(Error::BareRepository {
                path: root.to_native(),
            });
        }
        Ok(Self { root })
    }

    /// Find the checkout containing `path`, searching parent directories.
    pub fn discover(path: &NormalizedPath) -> Result<Self> {
        let repo = Repository::discover(path.to_native()).map_err(|_| Error::NotARepository {
            path: path.to_native(),
        })?;
        let workdir = repo.workdir().ok_or_else(|| Error::BareRepository {
            path: repo.path().to_path_buf(),
        })?;
        Ok(Self {
            root: NormalizedPath::new(workdir),
        })
    }

    /// Name of the checked-out branch, `HEAD` when detached.
    pub fn current_branch(&self) -> Result<String> {
        let repo = Repository::open(self.root.to_native())?;
        let head = repo.head()?;

        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            Ok("HEAD".to_string())
        }
    }
}

impl Scm for GitScm {
    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn kind(&self) -> ScmKind {
        ScmKind::Git
    }

    fn revision(&self) -> Result<Option<String>> {
        let repo = Repository::open(self.root.to_native())?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let commit = head.peel_to_commit()?;
        Ok(Some(commit.id().to_string()))
    }
}
