//! The per-project output manifest (`.artifacts/outputs.toml`).

use crate::tree::{FileEntry, Output};
use crate::{Error, Result};
use repo_fs::{ConfigStore, NormalizedPath, RepoPath};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared outputs of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub outputs: Vec<OutputDecl>,
}

/// One manifest entry. File outputs carry `checksum`/`size`; directory
/// outputs carry `files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDecl {
    /// Path relative to the project root
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exec: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, FileEntry>>,
}

impl OutputDecl {
    pub fn file(path: impl Into<String>, entry: FileEntry) -> Self {
        Self {
            path: path.into(),
            checksum: Some(entry.checksum),
            size: Some(entry.size),
            exec: entry.exec,
            files: None,
        }
    }

    pub fn directory(path: impl Into<String>, files: BTreeMap<String, FileEntry>) -> Self {
        Self {
            path: path.into(),
            checksum: None,
            size: None,
            exec: false,
            files: Some(files),
        }
    }
}

impl Manifest {
    /// Location of the manifest for the project at `root`.
    pub fn path_for(root: &NormalizedPath) -> NormalizedPath {
        root.join(RepoPath::ManagedDir.as_str())
            .join(RepoPath::Manifest.as_str())
    }

    /// Load the project's manifest; a missing file is an empty manifest.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = Self::path_for(root);
        let manifest = ConfigStore::new().load_optional(&path)?.unwrap_or_default();
        Ok(manifest)
    }

    pub fn save(&self, root: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(&Self::path_for(root), self)?;
        Ok(())
    }

    /// Resolve declarations into outputs anchored at `root`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidManifest`] for paths that are absolute or escape the
    /// project (or, for directory entries, the output), file outputs without
    /// a checksum, and duplicate paths.
    pub fn outputs(&self, root: &NormalizedPath) -> Result<Vec<Output>> {
        let manifest_path = Self::path_for(root);
        let invalid = |message: String| Error::InvalidManifest {
            path: manifest_path.to_native(),
            message,
        };

        let mut seen = BTreeSet::new();
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for decl in &self.outputs {
            let rel = NormalizedPath::new(&decl.path);
            if escapes(&rel) {
                return Err(invalid(format!("output path '{}' is outside the project", decl.path)));
            }
            let path = root.join(rel.as_str());
            if !seen.insert(path.clone()) {
                return Err(invalid(format!("output '{}' is declared twice", decl.path)));
            }

            let output = match (&decl.files, &decl.checksum) {
                (Some(files), None) => {
                    if let Some(entry) = files.keys().find(|key| escapes(&NormalizedPath::new(key))) {
                        return Err(invalid(format!(
                            "entry '{entry}' of output '{}' is outside the output",
                            decl.path
                        )));
                    }
                    Output::directory(path, files.clone())
                }
                (None, Some(checksum)) => Output::file(
                    path,
                    FileEntry {
                        checksum: checksum.clone(),
                        size: decl.size.unwrap_or(0),
                        exec: decl.exec,
                    },
                ),
                (Some(_), Some(_)) => {
                    return Err(invalid(format!(
                        "output '{}' has both a checksum and files",
                        decl.path
                    )));
                }
                (None, None) => {
                    return Err(invalid(format!("output '{}' has no checksum", decl.path)));
                }
            };
            outputs.push(output);
        }
        Ok(outputs)
    }
}

/// Whether a relative path names its base itself or leaves it.
fn escapes(rel: &NormalizedPath) -> bool {
    rel.is_absolute() || rel.components().next().is_none_or(|c| c == "..")
}
