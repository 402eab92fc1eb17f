//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Paths are cleaned lexically on construction: repeated separators are
/// collapsed, `.` components are dropped and `..` components are resolved
/// against the preceding component. A leading `//` (network share) is kept.
/// Two paths naming the same location therefore compare equal, which makes
/// `NormalizedPath` usable as a map key for repository roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if segment_normalized.starts_with('/') {
            return Self::new(segment_normalized);
        }
        Self::new(format!("{}/{}", self.inner, segment_normalized))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(1) if self.inner.starts_with("//") => Some(Self {
                inner: "//".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Iterate over this path and each of its ancestors, nearest first.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() || self.inner == "." {
            return None;
        }
        self.inner.rsplit('/').next()
    }

    /// Iterate over the non-empty components of this path.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|c| !c.is_empty() && *c != ".")
    }

    /// Whether this path starts from the filesystem root.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || Path::new(&self.inner).is_absolute()
    }

    fn is_root(&self) -> bool {
        self.inner == "/" || self.inner == "//"
    }

    /// Anchor a relative path at the current working directory.
    ///
    /// Absolute paths are returned unchanged.
    pub fn absolute(&self) -> Self {
        if self.is_absolute() {
            return self.clone();
        }
        match std::env::current_dir() {
            Ok(cwd) => Self::new(cwd).join(&self.inner),
            Err(_) => self.clone(),
        }
    }

    /// Component-wise prefix test: `/a/b` starts with `/a`, `/ab` does not.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        self.strip_prefix(base).is_some()
    }

    /// The remainder of this path below `base`, or `None` if `base` is not
    /// an ancestor (or equal). Equal paths yield an empty remainder.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<&str> {
        if self.inner == base.inner {
            return Some("");
        }
        if base.is_root() {
            return self
                .inner
                .strip_prefix(base.inner.as_str())
                .filter(|rest| !rest.is_empty());
        }
        let rest = self.inner.strip_prefix(base.inner.as_str())?;
        rest.strip_prefix('/')
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

/// Iterator returned by [`NormalizedPath::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<NormalizedPath>,
}

impl Iterator for Ancestors {
    type Item = NormalizedPath;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Lexically clean a forward-slash path string.
fn clean(path: &str) -> String {
    let (prefix, rest) = if path.starts_with("//") && !path.starts_with("///") {
        ("//", &path[2..])
    } else if let Some(rest) = path.strip_prefix('/') {
        ("/", rest)
    } else {
        ("", path)
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                // `..` above the root stays at the root
                _ if !prefix.is_empty() => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (prefix, joined.is_empty()) {
        ("", true) => ".".to_string(),
        (prefix, _) => format!("{prefix}{joined}"),
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<&NormalizedPath> for NormalizedPath {
    fn from(p: &NormalizedPath) -> Self {
        p.clone()
    }
}

/// Validate that a string is usable as a single path segment.
///
/// Rejects empty names, `.`/`..`, and anything containing a separator.
pub fn validate_path_identifier(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}
