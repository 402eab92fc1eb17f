//! Lazy discovery of nested projects.
//!
//! Resolution finds the nearest directory already recorded in the
//! [`SubrepoTrie`], then walks down towards the queried path one directory
//! at a time. Every directory on the way is recorded. A directory holding a
//! `.artifacts` marker is opened as a new project through the
//! [`RepoFactory`], and everything below it belongs to that project.

use crate::repo::{RepoFactory, RepoHandle};
use crate::tree::{ManagedTree, WorkingTree};
use crate::trie::SubrepoTrie;
use crate::Result;
use dashmap::DashMap;
use parking_lot::Mutex;
use repo_fs::{NormalizedPath, RepoPath};
use std::sync::Arc;

/// Working tree, managed tree and owning repo for a path.
#[derive(Clone)]
pub struct TreePair {
    pub repo: RepoHandle,
    pub working: Arc<dyn WorkingTree>,
    pub managed: Option<Arc<dyn ManagedTree>>,
}

impl std::fmt::Debug for TreePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreePair")
            .field("repo", &self.repo.root())
            .field("managed", &self.managed.is_some())
            .finish()
    }
}

pub struct RepoResolver {
    main: RepoHandle,
    trie: SubrepoTrie,
    managed: DashMap<NormalizedPath, Arc<dyn ManagedTree>>,
    discovery: Mutex<()>,
    factory: Arc<dyn RepoFactory>,
    traverse_subrepos: bool,
}

impl RepoResolver {
    pub fn new(main: RepoHandle, factory: Arc<dyn RepoFactory>, traverse_subrepos: bool) -> Self {
        let trie = SubrepoTrie::new();
        let managed = DashMap::new();
        if let Some(tree) = main.managed_tree() {
            managed.insert(main.root().clone(), Arc::clone(tree));
        }
        trie.insert(main.root().clone(), Arc::clone(&main));
        Self {
            main,
            trie,
            managed,
            discovery: Mutex::new(()),
            factory,
            traverse_subrepos,
        }
    }

    pub fn main(&self) -> &RepoHandle {
        &self.main
    }

    pub fn trie(&self) -> &SubrepoTrie {
        &self.trie
    }

    pub fn traverse_subrepos(&self) -> bool {
        self.traverse_subrepos
    }

    /// Managed tree of the project rooted at `root`, if one was opened.
    pub fn managed_tree(&self, root: &NormalizedPath) -> Option<Arc<dyn ManagedTree>> {
        self.managed.get(root).map(|entry| Arc::clone(entry.value()))
    }

    /// Repo owning `path`, or `None` when `path` is outside the main root.
    ///
    /// Calls for the same path always return the same handle; each nested
    /// project is opened at most once.
    pub fn resolve(&self, path: &NormalizedPath) -> Result<Option<RepoHandle>> {
        let Some((prefix, repo)) = self.trie.longest_prefix(path) else {
            return Ok(None);
        };
        if prefix == *path {
            return Ok(Some(repo));
        }

        let mut pending: Vec<NormalizedPath> = path
            .ancestors()
            .take_while(|dir| *dir != prefix)
            .collect();
        pending.reverse();
        self.discover(pending, repo)?;

        Ok(self.trie.get(path))
    }

    fn discover(&self, dirs: Vec<NormalizedPath>, mut repo: RepoHandle) -> Result<()> {
        let _guard = self.discovery.lock();
        for dir in dirs {
            if let Some(known) = self.trie.get(&dir) {
                repo = known;
                continue;
            }
            if self.is_repo_root(&dir) {
                repo = self.factory.open(
                    &dir,
                    Arc::clone(repo.scm()),
                    repo.revision(),
                    Arc::clone(&self.factory),
                )?;
                if let Some(tree) = repo.managed_tree() {
                    self.managed.insert(dir.clone(), Arc::clone(tree));
                }
                tracing::debug!(root = %dir, "discovered subrepo");
            }
            self.trie.insert(dir, Arc::clone(&repo));
        }
        Ok(())
    }

    /// Whether `dir` holds a project marker. Always false when subrepo
    /// traversal is disabled.
    pub fn is_repo_root(&self, dir: &NormalizedPath) -> bool {
        self.traverse_subrepos
            && self
                .main
                .working_tree()
                .isdir_unfiltered(&dir.join(RepoPath::ManagedDir.as_str()))
    }

    /// Trees for `path`, falling back to the main repo for paths outside it.
    pub fn tree_pair(&self, path: &NormalizedPath) -> Result<TreePair> {
        let repo = self
            .resolve(path)?
            .unwrap_or_else(|| Arc::clone(&self.main));
        Ok(TreePair {
            working: Arc::clone(repo.working_tree()),
            managed: self.managed_tree(repo.root()),
            repo,
        })
    }
}
