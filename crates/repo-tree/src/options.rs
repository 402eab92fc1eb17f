//! Per-project options (`.artifacts/config.toml`).

use crate::Result;
use repo_fs::io::DEFAULT_COPY_BUFFER;
use repo_fs::{ConfigStore, NormalizedPath, RepoPath};
use serde::{Deserialize, Serialize};

/// Options for a [`crate::RepoTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoTreeOptions {
    /// Discover nested projects and present their outputs
    pub traverse_subrepos: bool,
    /// Chunk size used by `download`
    pub copy_buffer_size: usize,
}

impl Default for RepoTreeOptions {
    fn default() -> Self {
        Self {
            traverse_subrepos: false,
            copy_buffer_size: DEFAULT_COPY_BUFFER,
        }
    }
}

impl RepoTreeOptions {
    pub fn with_subrepos(mut self, traverse: bool) -> Self {
        self.traverse_subrepos = traverse;
        self
    }

    pub fn with_copy_buffer_size(mut self, size: usize) -> Self {
        self.copy_buffer_size = size;
        self
    }

    /// Load options from an explicit file (TOML, JSON or YAML).
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Options of the project at `root`, or defaults when it has none.
    pub fn discover(root: &NormalizedPath) -> Result<Self> {
        let path = root
            .join(RepoPath::ManagedDir.as_str())
            .join(RepoPath::Config.as_str());
        let options = ConfigStore::new().load_optional(&path)?;
        if options.is_some() {
            tracing::debug!(path = %path, "loaded repo-tree options");
        }
        Ok(options.unwrap_or_default())
    }
}
