//! Repository handles and the factory that opens them.

use crate::cache::DirCache;
use crate::manifest::Manifest;
use crate::tree::{LocalTree, ManagedTree, OutputTree, WorkingTree};
use crate::{Error, Result};
use repo_fs::{NormalizedPath, RepoPath};
use repo_git::Scm;
use std::sync::Arc;

/// An opened project: its working tree, optional managed tree and the
/// version-control context it was opened under.
pub struct Repo {
    root: NormalizedPath,
    working: Arc<dyn WorkingTree>,
    managed: Option<Arc<dyn ManagedTree>>,
    scm: Arc<dyn Scm>,
    revision: Option<String>,
    factory: Option<Arc<dyn RepoFactory>>,
}

/// Shared handle to an opened [`Repo`].
pub type RepoHandle = Arc<Repo>;

impl Repo {
    pub fn new(
        root: impl Into<NormalizedPath>,
        working: Arc<dyn WorkingTree>,
        scm: Arc<dyn Scm>,
    ) -> Self {
        Self {
            root: root.into(),
            working,
            managed: None,
            scm,
            revision: None,
            factory: None,
        }
    }

    pub fn with_managed(mut self, managed: Option<Arc<dyn ManagedTree>>) -> Self {
        self.managed = managed;
        self
    }

    pub fn with_revision(mut self, revision: Option<String>) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn RepoFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn working_tree(&self) -> &Arc<dyn WorkingTree> {
        &self.working
    }

    pub fn managed_tree(&self) -> Option<&Arc<dyn ManagedTree>> {
        self.managed.as_ref()
    }

    pub fn scm(&self) -> &Arc<dyn Scm> {
        &self.scm
    }

    /// Revision this repo was opened at, if under version control.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Factory used to open nested projects, if one was attached.
    pub fn factory(&self) -> Option<&Arc<dyn RepoFactory>> {
        self.factory.as_ref()
    }
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("root", &self.root)
            .field("scm", &self.scm.kind())
            .field("revision", &self.revision)
            .field("managed", &self.managed.is_some())
            .finish()
    }
}

/// Opens repos for project roots discovered during resolution.
pub trait RepoFactory: Send + Sync {
    /// Open the project at `root` using the parent's version-control handle
    /// and revision. `factory` is the factory itself, to be attached to the
    /// new handle.
    fn open(
        &self,
        root: &NormalizedPath,
        scm: Arc<dyn Scm>,
        revision: Option<&str>,
        factory: Arc<dyn RepoFactory>,
    ) -> Result<RepoHandle>;
}

/// Default factory: a [`LocalTree`] working tree plus an [`OutputTree`]
/// built from the project's manifest and object cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestRepoFactory;

impl ManifestRepoFactory {
    /// Open the top-level project at `root`, detecting its version control.
    pub fn open_main(root: &NormalizedPath) -> Result<RepoHandle> {
        let root = root.absolute();
        if !root.is_dir() {
            return Err(Error::not_found(&root));
        }
        let scm = repo_git::detect(&root);
        let revision = scm.revision()?;
        let factory: Arc<dyn RepoFactory> = Arc::new(Self);
        factory.open(&root, scm, revision.as_deref(), Arc::clone(&factory))
    }

    fn managed_tree(root: &NormalizedPath) -> Result<Option<Arc<dyn ManagedTree>>> {
        let marker = root.join(RepoPath::ManagedDir.as_str());
        if !marker.is_dir() {
            return Ok(None);
        }
        let manifest = Manifest::load(root)?;
        let cache = DirCache::new(marker.join(RepoPath::Cache.as_str()));
        let tree = OutputTree::new(root.clone(), manifest.outputs(root)?, Arc::new(cache));
        Ok(Some(Arc::new(tree)))
    }
}

impl RepoFactory for ManifestRepoFactory {
    fn open(
        &self,
        root: &NormalizedPath,
        scm: Arc<dyn Scm>,
        revision: Option<&str>,
        factory: Arc<dyn RepoFactory>,
    ) -> Result<RepoHandle> {
        let managed = Self::managed_tree(root)?;
        tracing::debug!(
            root = %root,
            revision = revision.unwrap_or("-"),
            managed = managed.is_some(),
            "opened repo"
        );
        let repo = Repo::new(root.clone(), Arc::new(LocalTree::new(root.clone())), scm)
            .with_managed(managed)
            .with_revision(revision.map(str::to_string))
            .with_factory(factory);
        Ok(Arc::new(repo))
    }
}
