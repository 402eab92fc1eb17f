//! Filesystem primitives for repo-tree
//!
//! Normalized paths, repository markers, content checksums, atomic and
//! streaming I/O, and format-agnostic config files.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use constants::{RepoPath, is_definition_file, is_internal_file};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_path_identifier};
