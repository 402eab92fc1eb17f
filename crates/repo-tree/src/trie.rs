//! Directory-to-repo map with longest-prefix lookup.

use crate::repo::RepoHandle;
use dashmap::DashMap;
use repo_fs::NormalizedPath;
use std::sync::Arc;

/// Maps every directory resolution has visited to the repo owning it.
///
/// Entries are written once and never replaced. Lookups take the nearest
/// recorded ancestor of a path.
#[derive(Debug, Default)]
pub struct SubrepoTrie {
    entries: DashMap<NormalizedPath, RepoHandle>,
}

impl SubrepoTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repo recorded for exactly `path`.
    pub fn get(&self, path: &NormalizedPath) -> Option<RepoHandle> {
        self.entries.get(path).map(|entry| Arc::clone(entry.value()))
    }

    /// Nearest recorded ancestor of `path` (or `path` itself) and its repo.
    pub fn longest_prefix(&self, path: &NormalizedPath) -> Option<(NormalizedPath, RepoHandle)> {
        path.ancestors()
            .find_map(|dir| self.get(&dir).map(|repo| (dir, repo)))
    }

    /// Record `repo` for `path` unless an entry already exists. Returns the
    /// handle now stored.
    pub(crate) fn insert(&self, path: NormalizedPath, repo: RepoHandle) -> RepoHandle {
        Arc::clone(self.entries.entry(path).or_insert(repo).value())
    }

    pub fn contains(&self, path: &NormalizedPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
