//! [`RepoTree`]: the merged, read-only view a caller works against.

use crate::metadata::Metadata;
use crate::options::RepoTreeOptions;
use crate::repo::{ManifestRepoFactory, RepoFactory, RepoHandle};
use crate::resolver::{RepoResolver, TreePair};
use crate::tree::{EntryStat, TreeInfo};
use crate::walker::{MergedWalk, WalkOptions};
use crate::{Error, Result};
use repo_fs::NormalizedPath;
use std::fs::File;
use std::io::Read;
use std::sync::Arc;

/// Working tree and tracked outputs of a project (and, optionally, its
/// nested projects) presented as one tree.
///
/// All paths are absolute or relative to the current directory. Paths
/// outside the main project resolve against the main project's trees.
pub struct RepoTree {
    resolver: RepoResolver,
    options: RepoTreeOptions,
}

impl RepoTree {
    /// Tree over `main`, opening nested projects with the factory attached
    /// to `main` (or [`ManifestRepoFactory`] when it has none).
    pub fn new(main: RepoHandle, options: RepoTreeOptions) -> Self {
        let factory = main
            .factory()
            .cloned()
            .unwrap_or_else(|| Arc::new(ManifestRepoFactory));
        Self::with_factory(main, options, factory)
    }

    pub fn with_factory(
        main: RepoHandle,
        options: RepoTreeOptions,
        factory: Arc<dyn RepoFactory>,
    ) -> Self {
        tracing::debug!(
            root = %main.root(),
            traverse_subrepos = options.traverse_subrepos,
            "created repo tree"
        );
        Self {
            resolver: RepoResolver::new(main, factory, options.traverse_subrepos),
            options,
        }
    }

    /// Open the project at `root` with the options stored in it.
    pub fn from_root(root: impl Into<NormalizedPath>) -> Result<Self> {
        let main = ManifestRepoFactory::open_main(&root.into())?;
        let options = RepoTreeOptions::discover(main.root())?;
        Ok(Self::new(main, options))
    }

    pub fn root(&self) -> &NormalizedPath {
        self.resolver.main().root()
    }

    pub fn main_repo(&self) -> &RepoHandle {
        self.resolver.main()
    }

    pub fn options(&self) -> &RepoTreeOptions {
        &self.options
    }

    /// Project owning `path`; `None` outside the main project.
    pub fn resolve(&self, path: &NormalizedPath) -> Result<Option<RepoHandle>> {
        self.resolver.resolve(&path.absolute())
    }

    pub fn tree_pair(&self, path: &NormalizedPath) -> Result<TreePair> {
        self.resolver.tree_pair(&path.absolute())
    }

    /// Open a file, from the working tree when present, else from the
    /// object cache.
    pub fn open(&self, path: &NormalizedPath) -> Result<Box<dyn Read + Send>> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.open(&path)
    }

    pub fn exists(&self, path: &NormalizedPath) -> Result<bool> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.exists(&path)
    }

    pub fn isdir(&self, path: &NormalizedPath) -> Result<bool> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.isdir(&path)
    }

    pub fn isfile(&self, path: &NormalizedPath) -> Result<bool> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.isfile(&path)
    }

    pub fn isexec(&self, path: &NormalizedPath) -> Result<bool> {
        let path = path.absolute();
        Ok(self.resolver.tree_pair(&path)?.isexec(&path))
    }

    /// Whether `path` is exactly the root of a tracked output.
    pub fn is_tracked(&self, path: &NormalizedPath) -> Result<bool> {
        let path = path.absolute();
        Ok(self.resolver.tree_pair(&path)?.is_tracked(&path))
    }

    pub fn stat(&self, path: &NormalizedPath) -> Result<EntryStat> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.stat(&path)
    }

    pub fn metadata(&self, path: &NormalizedPath) -> Result<Metadata> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.metadata(&path)
    }

    pub fn info(&self, path: &NormalizedPath) -> Result<TreeInfo> {
        let path = path.absolute();
        self.resolver.tree_pair(&path)?.info(&path)
    }

    /// Walk the merged tree from `top`.
    ///
    /// A missing or non-directory `top` yields nothing; use
    /// [`RepoTree::walk_or_else`] to observe that case.
    pub fn walk(&self, top: &NormalizedPath, options: WalkOptions) -> MergedWalk<'_> {
        self.walk_or_else(top, options, |_| {})
    }

    /// Like [`RepoTree::walk`], but hands a missing or non-directory `top`
    /// to `on_error` before yielding nothing.
    pub fn walk_or_else<F>(&self, top: &NormalizedPath, options: WalkOptions, on_error: F) -> MergedWalk<'_>
    where
        F: FnOnce(Error),
    {
        match self.start_walk(&top.absolute(), options) {
            Ok(walk) => walk,
            Err(err @ (Error::NotFound { .. } | Error::NotADirectory { .. })) => {
                on_error(err);
                MergedWalk::empty(&self.resolver)
            }
            Err(err) => MergedWalk::failed(&self.resolver, err),
        }
    }

    fn start_walk(&self, top: &NormalizedPath, options: WalkOptions) -> Result<MergedWalk<'_>> {
        let pair = self.resolver.tree_pair(top)?;
        if !pair.exists(top)? {
            return Err(Error::not_found(top));
        }
        if !pair.isdir(top)? {
            return Err(Error::NotADirectory {
                path: top.to_native(),
            });
        }

        let follow = options
            .follow_subrepos
            .unwrap_or(self.resolver.traverse_subrepos());
        let on_disk = pair.working.exists(top);
        let working = on_disk.then(|| pair.working.walk(top, !follow));
        let managed = pair
            .managed
            .as_ref()
            .filter(|tree| !(on_disk && tree.is_tracked(top)) && tree.exists(top))
            .map(|tree| tree.walk(top, false));

        Ok(MergedWalk::new(
            &self.resolver,
            working,
            managed,
            options.include_internal_files,
        ))
    }

    /// Every file below `top`, as absolute paths, in walk order.
    pub fn walk_files<'a>(
        &'a self,
        top: &NormalizedPath,
        options: WalkOptions,
    ) -> impl Iterator<Item = Result<NormalizedPath>> + use<'a> {
        self.walk(top, options).flat_map(|level| match level {
            Ok(level) => {
                let dir = level.dir;
                level
                    .files
                    .into_iter()
                    .map(|name| Ok(dir.join(&name)))
                    .collect::<Vec<_>>()
            }
            Err(err) => vec![Err(err)],
        })
    }

    /// Copy `from` in this tree to the local file `to`.
    pub fn download(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<u64> {
        self.download_with_progress(from, to, |_| {})
    }

    /// Like [`RepoTree::download`], reporting each copied chunk's size.
    pub fn download_with_progress<F>(
        &self,
        from: &NormalizedPath,
        to: &NormalizedPath,
        progress: F,
    ) -> Result<u64>
    where
        F: FnMut(u64),
    {
        let mut reader = self.open(from)?;
        let mut file = File::create(to.to_native()).map_err(|e| Error::io(to, e))?;
        let copied = repo_fs::io::copy_with_progress(
            &mut reader,
            &mut file,
            self.options.copy_buffer_size,
            progress,
        )
        .map_err(|e| Error::io(to, e))?;
        tracing::info!(from = %from, to = %to, bytes = copied, "downloaded");
        Ok(copied)
    }
}
