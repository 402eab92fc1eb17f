//! Content-addressed object storage backing the managed tree.

use crate::{Error, Result};
use parking_lot::RwLock;
use repo_fs::checksum::{compute_bytes_checksum, object_path};
use repo_fs::io::{RobustnessConfig, write_atomic};
use repo_fs::NormalizedPath;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::sync::Arc;

/// Read access to objects by checksum.
pub trait ObjectCache: Send + Sync + std::fmt::Debug {
    /// # Errors
    ///
    /// [`Error::ObjectMissing`] when no object with this checksum is stored.
    fn open(&self, checksum: &str) -> Result<Box<dyn Read + Send>>;

    fn contains(&self, checksum: &str) -> bool;
}

/// Object cache laid out on disk as `<root>/<hex[..2]>/<hex[2..]>`.
#[derive(Debug, Clone)]
pub struct DirCache {
    root: NormalizedPath,
}

impl DirCache {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Store `content`, returning its checksum.
    pub fn insert(&self, content: &[u8]) -> Result<String> {
        let checksum = compute_bytes_checksum(content);
        let path = object_path(&self.root, &checksum)?;
        if !path.is_file() {
            write_atomic(&path, content, RobustnessConfig::default())?;
        }
        Ok(checksum)
    }
}

impl ObjectCache for DirCache {
    fn open(&self, checksum: &str) -> Result<Box<dyn Read + Send>> {
        let path = object_path(&self.root, checksum)?;
        match fs::File::open(path.to_native()) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ObjectMissing {
                checksum: checksum.to_string(),
            }),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    fn contains(&self, checksum: &str) -> bool {
        object_path(&self.root, checksum).is_ok_and(|path| path.is_file())
    }
}

/// In-process object cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    objects: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, content: &[u8]) -> String {
        let checksum = compute_bytes_checksum(content);
        self.objects
            .write()
            .entry(checksum.clone())
            .or_insert_with(|| Arc::from(content));
        checksum
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl ObjectCache for MemoryCache {
    fn open(&self, checksum: &str) -> Result<Box<dyn Read + Send>> {
        let object = self
            .objects
            .read()
            .get(checksum)
            .cloned()
            .ok_or_else(|| Error::ObjectMissing {
                checksum: checksum.to_string(),
            })?;
        Ok(Box::new(Cursor::new(object)))
    }

    fn contains(&self, checksum: &str) -> bool {
        self.objects.read().contains_key(checksum)
    }
}
