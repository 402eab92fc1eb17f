//! Tree abstractions shared by the working tree and the managed tree.
//!
//! Both trees answer the same questions about absolute paths and can walk
//! themselves one directory level at a time. The walk is *steerable*: after
//! a level has been yielded, the caller may replace the list of child
//! directories that will be descended into. The merged walker relies on
//! this to keep two walks aligned on the same directory.

pub mod local;
pub mod output;
pub mod walk;

use crate::Result;
use repo_fs::NormalizedPath;
use std::io::Read;

pub use local::{IgnoreRules, LocalTree};
pub use output::{FileEntry, ManagedMetadata, Output, OutputKind, OutputTree};
pub use walk::{LevelWalk, ListDir, Listing};

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Stat-like record for a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    pub kind: EntryKind,
    pub size: u64,
    /// Unix permission bits (`0o777` mask); zero where the platform has none
    pub mode: u32,
}

impl EntryStat {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Any of the user, group or other execute bits is set.
    pub fn is_exec(&self) -> bool {
        self.mode & 0o111 != 0
    }
}

/// Summary record returned by `info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeInfo {
    pub kind: EntryKind,
    pub size: u64,
    /// Content address, known only for tracked files
    pub checksum: Option<String>,
    pub is_exec: bool,
}

/// One level of a top-down directory walk.
///
/// Names in `dirs` and `files` are plain entry names relative to `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkLevel {
    pub dir: NormalizedPath,
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

/// A top-down walk whose pending child directories can be replaced.
pub trait DirWalk: Iterator<Item = WalkLevel> + Send {
    /// Replace the child directories of the most recently yielded level.
    ///
    /// Only the named children are descended into, in the given order.
    /// Has no effect before the first level is yielded.
    fn steer(&mut self, dirs: Vec<String>);
}

/// Read-only access to a tree of files addressed by absolute path.
pub trait FileTree: Send + Sync {
    /// Root directory this tree is anchored at.
    fn root(&self) -> &NormalizedPath;

    /// Open a file for reading.
    fn open(&self, path: &NormalizedPath) -> Result<Box<dyn Read + Send>>;

    fn exists(&self, path: &NormalizedPath) -> bool;

    fn stat(&self, path: &NormalizedPath) -> Result<EntryStat>;

    fn isdir(&self, path: &NormalizedPath) -> bool;

    fn isfile(&self, path: &NormalizedPath) -> bool;

    fn isexec(&self, path: &NormalizedPath) -> bool;

    /// Walk top-down from `top`. With `ignore_subrepos`, directories that
    /// are themselves project roots are pruned.
    fn walk(&self, top: &NormalizedPath, ignore_subrepos: bool) -> Box<dyn DirWalk>;

    fn info(&self, path: &NormalizedPath) -> Result<TreeInfo>;
}

/// The on-disk checkout.
pub trait WorkingTree: FileTree {
    /// Directory check that bypasses ignore rules and pruning.
    fn isdir_unfiltered(&self, path: &NormalizedPath) -> bool;
}

/// The tracked-artifact view of a project.
pub trait ManagedTree: FileTree {
    /// Output metadata for `path`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] when no output covers or lies below `path`.
    fn metadata(&self, path: &NormalizedPath) -> Result<ManagedMetadata>;

    /// Whether `path` is exactly the root of a tracked output.
    fn is_tracked(&self, path: &NormalizedPath) -> bool;
}
