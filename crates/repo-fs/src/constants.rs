//! Constants and enums for repository filesystem paths.

use std::path::Path;

/// Suffix of single-output definition files (`data.csv.artifact`).
pub const DEFINITION_SUFFIX: &str = ".artifact";

/// Standard repository filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    /// The `.artifacts` directory; its presence marks a project root
    ManagedDir,
    /// The `.git` directory (Git database)
    GitDir,
    /// Ignore rules for the working tree, read from the project root
    IgnoreFile,
    /// Pipeline definition file
    PipelineFile,
    /// Legacy single definition file at a directory level
    DefinitionFile,
    /// Output manifest inside the managed directory
    Manifest,
    /// Object cache inside the managed directory
    Cache,
    /// Per-project options inside the managed directory
    Config,
}

impl RepoPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagedDir => ".artifacts",
            Self::GitDir => ".git",
            Self::IgnoreFile => ".artifactignore",
            Self::PipelineFile => "artifacts.yaml",
            Self::DefinitionFile => "Artifactfile",
            Self::Manifest => "outputs.toml",
            Self::Cache => "cache",
            Self::Config => "config.toml",
        }
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `name` is a pipeline or output definition file.
pub fn is_definition_file(name: &str) -> bool {
    (name.ends_with(DEFINITION_SUFFIX) && name.len() > DEFINITION_SUFFIX.len())
        || name == RepoPath::PipelineFile.as_str()
        || name == RepoPath::DefinitionFile.as_str()
}

/// Whether `name` is bookkeeping that walks hide unless asked otherwise.
pub fn is_internal_file(name: &str) -> bool {
    is_definition_file(name) || name == RepoPath::IgnoreFile.as_str()
}
