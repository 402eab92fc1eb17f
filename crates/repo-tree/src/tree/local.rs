//! The working tree: plain files on disk, filtered by ignore rules.

use super::walk::{LevelWalk, ListDir, Listing};
use super::{DirWalk, EntryKind, EntryStat, FileTree, TreeInfo, WorkingTree};
use crate::{Error, Result};
use repo_fs::{NormalizedPath, RepoPath};
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;

/// Patterns read from a project's ignore file.
///
/// One pattern per line; blank lines and `#` comments are skipped.
/// `name` matches any path component equal to `name`, `*.ext` matches
/// components ending in `.ext`, and `name/` matches directories only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Name(String),
    Suffix(String),
    DirName(String),
}

impl IgnoreRules {
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                if let Some(suffix) = line.strip_prefix('*') {
                    Pattern::Suffix(suffix.to_string())
                } else if let Some(dir) = line.strip_suffix('/') {
                    Pattern::DirName(dir.to_string())
                } else {
                    Pattern::Name(line.to_string())
                }
            })
            .collect();
        Self { patterns }
    }

    /// Read `<root>/.artifactignore`; a missing file means no rules.
    pub fn load(root: &NormalizedPath) -> Self {
        let path = root.join(RepoPath::IgnoreFile.as_str());
        match fs::read_to_string(path.to_native()) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path, error = %e, "could not read ignore file");
                }
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` below `root` is ignored. Paths outside `root` never are.
    pub fn is_ignored(&self, root: &NormalizedPath, path: &NormalizedPath) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let Some(rel) = path.strip_prefix(root) else {
            return false;
        };
        let components: Vec<&str> = rel.split('/').filter(|c| !c.is_empty()).collect();
        let last = components.len().saturating_sub(1);

        components.iter().enumerate().any(|(i, component)| {
            self.patterns.iter().any(|pattern| match pattern {
                Pattern::Name(name) => component == name,
                Pattern::Suffix(suffix) => component.ends_with(suffix.as_str()),
                Pattern::DirName(name) => component == name && (i < last || path.is_dir()),
            })
        })
    }
}

/// Working tree rooted at a project directory.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: NormalizedPath,
    ignore: Arc<IgnoreRules>,
}

impl LocalTree {
    /// Working tree at `root` using the ignore rules found there.
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        let root = root.into();
        let ignore = IgnoreRules::load(&root);
        Self::with_ignore(root, ignore)
    }

    pub fn with_ignore(root: impl Into<NormalizedPath>, ignore: IgnoreRules) -> Self {
        Self {
            root: root.into(),
            ignore: Arc::new(ignore),
        }
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    fn is_ignored(&self, path: &NormalizedPath) -> bool {
        self.ignore.is_ignored(&self.root, path)
    }
}

fn entry_stat(meta: &fs::Metadata) -> EntryStat {
    let kind = if meta.is_dir() {
        EntryKind::Directory
    } else if meta.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    EntryStat {
        kind,
        size: meta.len(),
        mode: permission_bits(meta),
    }
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(_meta: &fs::Metadata) -> u32 {
    0
}

impl FileTree for LocalTree {
    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn open(&self, path: &NormalizedPath) -> Result<Box<dyn Read + Send>> {
        let native = path.to_native();
        if native.is_dir() {
            return Err(Error::io(path, io::Error::from(io::ErrorKind::IsADirectory)));
        }
        let file = fs::File::open(&native).map_err(|e| Error::io(path, e))?;
        Ok(Box::new(file))
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        !self.is_ignored(path) && path.exists()
    }

    fn stat(&self, path: &NormalizedPath) -> Result<EntryStat> {
        let meta = fs::metadata(path.to_native()).map_err(|e| Error::io(path, e))?;
        Ok(entry_stat(&meta))
    }

    fn isdir(&self, path: &NormalizedPath) -> bool {
        !self.is_ignored(path) && path.is_dir()
    }

    fn isfile(&self, path: &NormalizedPath) -> bool {
        !self.is_ignored(path) && path.is_file()
    }

    fn isexec(&self, path: &NormalizedPath) -> bool {
        self.stat(path).is_ok_and(|stat| stat.is_exec())
    }

    fn walk(&self, top: &NormalizedPath, ignore_subrepos: bool) -> Box<dyn DirWalk> {
        let lister = DiskLister {
            root: self.root.clone(),
            ignore: Arc::clone(&self.ignore),
            ignore_subrepos,
        };
        Box::new(LevelWalk::new(lister, top.clone()))
    }

    fn info(&self, path: &NormalizedPath) -> Result<TreeInfo> {
        let stat = self.stat(path)?;
        Ok(TreeInfo {
            kind: stat.kind,
            size: stat.size,
            checksum: None,
            is_exec: stat.is_exec(),
        })
    }
}

impl WorkingTree for LocalTree {
    fn isdir_unfiltered(&self, path: &NormalizedPath) -> bool {
        path.is_dir()
    }
}

struct DiskLister {
    root: NormalizedPath,
    ignore: Arc<IgnoreRules>,
    ignore_subrepos: bool,
}

impl DiskLister {
    fn is_pruned(&self, child: &NormalizedPath, name: &str) -> bool {
        name == RepoPath::GitDir.as_str()
            || name == RepoPath::ManagedDir.as_str()
            || (self.ignore_subrepos && child.join(RepoPath::ManagedDir.as_str()).is_dir())
    }
}

impl ListDir for DiskLister {
    fn list(&self, dir: &NormalizedPath) -> io::Result<Listing> {
        let mut listing = Listing::default();

        for entry in fs::read_dir(dir.to_native())? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(dir = %dir, "skipping entry with a non UTF-8 name");
                continue;
            };
            let child = dir.join(&name);
            if self.ignore.is_ignored(&self.root, &child) {
                continue;
            }

            let file_type = entry.file_type()?;
            let is_dir = if file_type.is_symlink() {
                fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir())
            } else {
                file_type.is_dir()
            };

            if is_dir {
                if !self.is_pruned(&child, &name) {
                    listing.dirs.push(name);
                }
            } else {
                listing.files.push(name);
            }
        }

        listing.dirs.sort();
        listing.files.sort();
        Ok(listing)
    }
}
