//! Merged view over a project's working tree and its tracked outputs
//!
//! A project keeps large outputs out of version control: their content lives
//! in an object cache and a manifest records which paths they occupy. A
//! [`RepoTree`] answers filesystem questions (`exists`, `isdir`, `open`,
//! `walk`, ...) as if every tracked output were checked out, preferring
//! whatever is actually on disk. Nested projects are discovered lazily and,
//! when enabled, presented through the same tree.

pub mod cache;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod options;
pub mod repo;
pub mod repo_tree;
pub mod resolver;
pub mod tree;
pub mod trie;
pub mod walker;

pub use cache::{DirCache, MemoryCache, ObjectCache};
pub use error::{Error, Result};
pub use manifest::{Manifest, OutputDecl};
pub use metadata::Metadata;
pub use options::RepoTreeOptions;
pub use repo::{ManifestRepoFactory, Repo, RepoFactory, RepoHandle};
pub use repo_tree::RepoTree;
pub use resolver::{RepoResolver, TreePair};
pub use tree::{
    DirWalk, EntryKind, EntryStat, FileEntry, FileTree, LocalTree, ManagedMetadata, ManagedTree,
    Output, OutputKind, OutputTree, TreeInfo, WalkLevel, WorkingTree,
};
pub use trie::SubrepoTrie;
pub use walker::{MergedWalk, WalkFrame, WalkOptions};
