//! Answers about one path, combined from its working and managed trees.
//!
//! The working tree wins wherever it has an answer. The managed tree fills
//! in for tracked content that is not checked out, but only while the
//! output covering the path is itself absent from the working tree: once an
//! output root exists on disk it shadows everything the managed tree says
//! about paths inside it.

use crate::repo::RepoHandle;
use crate::resolver::TreePair;
use crate::tree::{EntryStat, ManagedMetadata, Output, TreeInfo};
use crate::{Error, Result};
use repo_fs::NormalizedPath;
use std::io::Read;

/// Combined metadata record for a path.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub path: NormalizedPath,
    /// Project owning the path
    pub repo: RepoHandle,
    /// Outputs at or above the path
    pub outs: Vec<Output>,
    pub is_output: bool,
    pub isdir: bool,
    pub isfile: bool,
    pub is_exec: bool,
}

impl Metadata {
    pub fn is_tracked(&self) -> bool {
        !self.outs.is_empty()
    }
}

impl TreePair {
    /// Managed metadata for `path`, unless the covering output is shadowed
    /// by the working tree.
    fn managed_hit(&self, path: &NormalizedPath) -> Result<Option<ManagedMetadata>> {
        let Some(managed) = &self.managed else {
            return Ok(None);
        };
        let meta = match managed.metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        if let Some(out) = meta.covering_output()? {
            if self.working.exists(&out.path) {
                return Ok(None);
            }
        }
        Ok(Some(meta))
    }

    pub fn exists(&self, path: &NormalizedPath) -> Result<bool> {
        if self.working.exists(path) {
            return Ok(true);
        }
        Ok(self.managed_hit(path)?.is_some())
    }

    pub fn isdir(&self, path: &NormalizedPath) -> Result<bool> {
        // Any stat failure counts as absent
        if let Ok(stat) = self.working.stat(path) {
            return Ok(stat.is_dir());
        }
        Ok(self.managed_hit(path)?.is_some_and(|meta| meta.isdir))
    }

    pub fn isfile(&self, path: &NormalizedPath) -> Result<bool> {
        if let Ok(stat) = self.working.stat(path) {
            return Ok(stat.is_file());
        }
        Ok(self.managed_hit(path)?.is_some_and(|meta| meta.isfile))
    }

    /// The managed flag wins whenever the managed tree knows the path.
    pub fn isexec(&self, path: &NormalizedPath) -> bool {
        match &self.managed {
            Some(managed) if managed.exists(path) => managed.isexec(path),
            _ => self.working.isexec(path),
        }
    }

    pub fn stat(&self, path: &NormalizedPath) -> Result<EntryStat> {
        match self.working.stat(path) {
            Err(e) if e.is_not_found() => match (&self.managed, self.managed_hit(path)?) {
                (Some(managed), Some(_)) => managed.stat(path),
                _ => Err(e),
            },
            other => other,
        }
    }

    pub fn info(&self, path: &NormalizedPath) -> Result<TreeInfo> {
        match self.working.info(path) {
            Err(e) if e.is_not_found() => match &self.managed {
                Some(managed) => managed.info(path),
                None => Err(e),
            },
            other => other,
        }
    }

    pub fn open(&self, path: &NormalizedPath) -> Result<Box<dyn Read + Send>> {
        match self.working.open(path) {
            Err(e) if e.is_not_found() => match &self.managed {
                Some(managed) => managed.open(path),
                None => Err(e),
            },
            other => other,
        }
    }

    pub fn is_tracked(&self, path: &NormalizedPath) -> bool {
        self.managed
            .as_ref()
            .is_some_and(|managed| managed.is_tracked(path))
    }

    /// Combined record from both trees.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when neither tree knows the path.
    pub fn metadata(&self, path: &NormalizedPath) -> Result<Metadata> {
        let managed = match &self.managed {
            Some(tree) => match tree.metadata(path) {
                Ok(meta) => Some(meta),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        let stat = match self.working.stat(path) {
            Ok(stat) => Some(stat),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        let record = match (managed, stat) {
            (None, None) => return Err(Error::not_found(path)),
            (None, Some(stat)) => Metadata {
                path: path.clone(),
                repo: self.repo.clone(),
                outs: Vec::new(),
                is_output: false,
                isdir: stat.is_dir(),
                isfile: stat.is_file(),
                is_exec: stat.is_exec(),
            },
            (Some(meta), stat) => {
                let isdir = meta.isdir || stat.is_some_and(|s| s.is_dir());
                Metadata {
                    path: path.clone(),
                    repo: self.repo.clone(),
                    outs: meta.outs,
                    is_output: meta.is_output,
                    isdir,
                    isfile: !isdir && meta.isfile,
                    is_exec: meta.is_exec,
                }
            }
        };
        Ok(record)
    }
}
