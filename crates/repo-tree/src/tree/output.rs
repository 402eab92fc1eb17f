//! The managed tree: tracked outputs served from an object cache.
//!
//! An output is either a single file or a directory holding a flat map of
//! relative paths to file entries. Directories implied by output paths
//! ("parents of outputs") exist in the managed tree but carry no output.

use super::walk::{LevelWalk, ListDir, Listing};
use super::{DirWalk, EntryKind, EntryStat, FileTree, ManagedTree, TreeInfo};
use crate::cache::ObjectCache;
use crate::{Error, Result};
use repo_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};
use std::sync::Arc;

/// A tracked file: content address, size and executable flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub checksum: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exec: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    File(FileEntry),
    /// Entries keyed by normalized path relative to the output root
    Directory(BTreeMap<String, FileEntry>),
}

/// A declared output of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub path: NormalizedPath,
    pub kind: OutputKind,
}

enum Node<'a> {
    File(&'a FileEntry),
    Dir,
}

impl Output {
    pub fn file(path: impl Into<NormalizedPath>, entry: FileEntry) -> Self {
        Self {
            path: path.into(),
            kind: OutputKind::File(entry),
        }
    }

    pub fn directory(
        path: impl Into<NormalizedPath>,
        entries: impl IntoIterator<Item = (String, FileEntry)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(rel, entry)| (NormalizedPath::new(rel).as_str().to_string(), entry))
            .collect();
        Self {
            path: path.into(),
            kind: OutputKind::Directory(entries),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, OutputKind::Directory(_))
    }

    /// Total size of the tracked content.
    pub fn size(&self) -> u64 {
        match &self.kind {
            OutputKind::File(entry) => entry.size,
            OutputKind::Directory(entries) => entries.values().map(|e| e.size).sum(),
        }
    }

    fn node(&self, path: &NormalizedPath) -> Option<Node<'_>> {
        let rel = path.strip_prefix(&self.path)?;
        match &self.kind {
            OutputKind::File(entry) => rel.is_empty().then_some(Node::File(entry)),
            OutputKind::Directory(_) if rel.is_empty() => Some(Node::Dir),
            OutputKind::Directory(entries) => {
                if let Some(entry) = entries.get(rel) {
                    return Some(Node::File(entry));
                }
                entries
                    .keys()
                    .any(|key| below(key, rel).is_some())
                    .then_some(Node::Dir)
            }
        }
    }
}

/// Remainder of `key` strictly below the relative directory `dir`.
fn below<'k>(key: &'k str, dir: &str) -> Option<&'k str> {
    if dir.is_empty() {
        return Some(key);
    }
    key.strip_prefix(dir)?.strip_prefix('/')
}

/// What the managed tree knows about one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedMetadata {
    pub path: NormalizedPath,
    /// Outputs at or above `path`; more than one means a corrupt index
    pub outs: Vec<Output>,
    pub isdir: bool,
    pub isfile: bool,
    pub is_exec: bool,
    /// `path` is exactly an output root
    pub is_output: bool,
    /// Some output lies strictly below `path`
    pub contains_outputs: bool,
}

impl ManagedMetadata {
    /// The single output covering this path, if any.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] when more than one output covers it.
    pub fn covering_output(&self) -> Result<Option<&Output>> {
        match self.outs.len() {
            0 | 1 => Ok(self.outs.first()),
            count => Err(Error::InvariantViolation {
                path: self.path.to_native(),
                count,
            }),
        }
    }
}

/// All outputs of one project, keyed by absolute output path.
#[derive(Debug, Default)]
pub(crate) struct OutputIndex {
    outputs: BTreeMap<NormalizedPath, Output>,
}

impl OutputIndex {
    fn metadata(&self, path: &NormalizedPath) -> Result<ManagedMetadata> {
        let covering: Vec<&Output> = self
            .outputs
            .values()
            .filter(|out| path.starts_with(&out.path))
            .collect();
        let node = covering.iter().find_map(|out| out.node(path));
        let contains_outputs = self
            .outputs
            .keys()
            .any(|out| out != path && out.starts_with(path));

        let (isdir, isfile, is_exec) = match node {
            Some(Node::File(entry)) => (false, true, entry.exec),
            Some(Node::Dir) => (true, false, false),
            None if contains_outputs => (true, false, false),
            None => return Err(Error::not_found(path)),
        };

        Ok(ManagedMetadata {
            path: path.clone(),
            outs: covering.into_iter().cloned().collect(),
            isdir,
            isfile,
            is_exec,
            is_output: self.outputs.contains_key(path),
            contains_outputs,
        })
    }

    fn file_entry(&self, path: &NormalizedPath) -> Option<&FileEntry> {
        self.outputs
            .values()
            .filter(|out| path.starts_with(&out.path))
            .find_map(|out| match out.node(path) {
                Some(Node::File(entry)) => Some(entry),
                _ => None,
            })
    }

    fn list(&self, dir: &NormalizedPath) -> Listing {
        let mut dirs = BTreeSet::new();
        let mut files = BTreeSet::new();

        for out in self.outputs.values() {
            if let Some(rel) = out.path.strip_prefix(dir).filter(|rel| !rel.is_empty()) {
                // Output lives below this directory
                match rel.split_once('/') {
                    None if !out.is_dir() => files.insert(rel.to_string()),
                    None => dirs.insert(rel.to_string()),
                    Some((first, _)) => dirs.insert(first.to_string()),
                };
            } else if let (Some(rel), OutputKind::Directory(entries)) =
                (dir.strip_prefix(&out.path), &out.kind)
            {
                // Directory inside (or at) a directory output
                for rest in entries.keys().filter_map(|key| below(key, rel)) {
                    match rest.split_once('/') {
                        None => files.insert(rest.to_string()),
                        Some((first, _)) => dirs.insert(first.to_string()),
                    };
                }
            }
        }

        // A name can't be both; directories win
        let files = files.into_iter().filter(|f| !dirs.contains(f)).collect();
        Listing {
            dirs: dirs.into_iter().collect(),
            files,
        }
    }
}

/// Managed tree of one project.
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: NormalizedPath,
    index: Arc<OutputIndex>,
    cache: Arc<dyn ObjectCache>,
}

impl OutputTree {
    pub fn new(
        root: impl Into<NormalizedPath>,
        outputs: impl IntoIterator<Item = Output>,
        cache: Arc<dyn ObjectCache>,
    ) -> Self {
        let outputs = outputs
            .into_iter()
            .map(|out| (out.path.clone(), out))
            .collect();
        Self {
            root: root.into(),
            index: Arc::new(OutputIndex { outputs }),
            cache,
        }
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.index.outputs.values()
    }

    pub fn cache(&self) -> &Arc<dyn ObjectCache> {
        &self.cache
    }
}

impl FileTree for OutputTree {
    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn open(&self, path: &NormalizedPath) -> Result<Box<dyn Read + Send>> {
        let entry = self.index.file_entry(path).ok_or_else(|| {
            if self.index.metadata(path).is_ok() {
                Error::io(path, io::Error::from(io::ErrorKind::IsADirectory))
            } else {
                Error::not_found(path)
            }
        })?;
        self.cache.open(&entry.checksum)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        self.index.metadata(path).is_ok()
    }

    fn stat(&self, path: &NormalizedPath) -> Result<EntryStat> {
        let meta = self.index.metadata(path)?;
        if meta.isdir {
            return Ok(EntryStat {
                kind: EntryKind::Directory,
                size: 0,
                mode: 0o755,
            });
        }
        let size = self.index.file_entry(path).map_or(0, |e| e.size);
        Ok(EntryStat {
            kind: EntryKind::File,
            size,
            mode: if meta.is_exec { 0o755 } else { 0o644 },
        })
    }

    fn isdir(&self, path: &NormalizedPath) -> bool {
        self.index.metadata(path).is_ok_and(|m| m.isdir)
    }

    fn isfile(&self, path: &NormalizedPath) -> bool {
        self.index.metadata(path).is_ok_and(|m| m.isfile)
    }

    fn isexec(&self, path: &NormalizedPath) -> bool {
        self.index.metadata(path).is_ok_and(|m| m.is_exec)
    }

    fn walk(&self, top: &NormalizedPath, _ignore_subrepos: bool) -> Box<dyn DirWalk> {
        let lister = IndexLister {
            index: Arc::clone(&self.index),
        };
        Box::new(LevelWalk::new(lister, top.clone()))
    }

    fn info(&self, path: &NormalizedPath) -> Result<TreeInfo> {
        let meta = self.index.metadata(path)?;
        let entry = self.index.file_entry(path);
        let size = if meta.isdir {
            meta.outs
                .iter()
                .filter(|out| out.path == *path)
                .map(Output::size)
                .sum()
        } else {
            entry.map_or(0, |e| e.size)
        };
        Ok(TreeInfo {
            kind: if meta.isdir {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            size,
            checksum: entry.map(|e| e.checksum.clone()),
            is_exec: meta.is_exec,
        })
    }
}

impl ManagedTree for OutputTree {
    fn metadata(&self, path: &NormalizedPath) -> Result<ManagedMetadata> {
        self.index.metadata(path)
    }

    fn is_tracked(&self, path: &NormalizedPath) -> bool {
        self.index.outputs.contains_key(path)
    }
}

struct IndexLister {
    index: Arc<OutputIndex>,
}

impl ListDir for IndexLister {
    fn list(&self, dir: &NormalizedPath) -> io::Result<Listing> {
        match self.index.metadata(dir) {
            Ok(meta) if meta.isdir => Ok(self.index.list(dir)),
            Ok(_) => Err(io::Error::from(io::ErrorKind::NotADirectory)),
            Err(_) => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}
