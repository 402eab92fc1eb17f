//! [`TestRepo`] builder for repo-tree test scenarios.
//!
//! A `TestRepo` is a temporary directory holding a working tree plus any
//! number of projects (the root or nested subprojects) with tracked outputs.
//! Tracked content goes into the project's object cache and manifest only;
//! it is not materialized unless the test also writes the working file.

use repo_fs::checksum::{compute_bytes_checksum, object_path};
use repo_fs::{NormalizedPath, RepoPath};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary repository directory with helper methods for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use repo_test_utils::TestRepo;
///
/// let mut repo = TestRepo::new();
/// repo.write("a.txt", "hello");
/// repo.init_project("");
/// repo.track_file("", "data/x.bin", b"xyz");
/// repo.assert_file_not_exists("data/x.bin");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
    root: NormalizedPath,
    /// Manifest entries per project, keyed by project path relative to root
    manifests: BTreeMap<String, Vec<String>>,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        // Resolve symlinked temp roots so paths compare equal to walk output
        let canonical = temp_dir.path().canonicalize().unwrap();
        Self {
            root: NormalizedPath::new(canonical),
            temp_dir,
            manifests: BTreeMap::new(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Return the root as a normalized (canonical) path.
    pub fn root_path(&self) -> &NormalizedPath {
        &self.root
    }

    /// Absolute normalized path of `rel` below the root.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    /// Write a working-tree file, creating parent directories.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> NormalizedPath {
        let path = self.path(rel);
        let native = path.to_native();
        if let Some(parent) = native.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&native, content).unwrap();
        path
    }

    /// Create a working-tree directory (and parents).
    pub fn mkdir(&self, rel: &str) -> NormalizedPath {
        let path = self.path(rel);
        fs::create_dir_all(path.to_native()).unwrap();
        path
    }

    /// Mark a working-tree file executable.
    #[cfg(unix)]
    pub fn make_executable(&self, rel: &str) {
        use std::os::unix::fs::PermissionsExt;
        let native = self.path(rel).to_native();
        let mut perms = fs::metadata(&native).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&native, perms).unwrap();
    }

    /// Make `project` (relative to root, `""` for the root itself) a project
    /// root by creating its `.artifacts` marker directory.
    pub fn init_project(&mut self, project: &str) -> NormalizedPath {
        let marker = self.path(project).join(RepoPath::ManagedDir.as_str());
        fs::create_dir_all(marker.to_native()).unwrap();
        self.manifests.entry(project.to_string()).or_default();
        self.flush_manifest(project);
        self.path(project)
    }

    /// Write ignore patterns for a project.
    pub fn write_ignore(&self, project: &str, patterns: &[&str]) {
        let rel = join_rel(project, RepoPath::IgnoreFile.as_str());
        self.write(&rel, patterns.join("\n"));
    }

    /// Track a single-file output at `rel` (relative to the project root)
    /// without materializing it.
    pub fn track_file(&mut self, project: &str, rel: &str, content: &[u8]) -> String {
        self.track_file_with_mode(project, rel, content, false)
    }

    /// Track an executable single-file output.
    pub fn track_exec_file(&mut self, project: &str, rel: &str, content: &[u8]) -> String {
        self.track_file_with_mode(project, rel, content, true)
    }

    fn track_file_with_mode(
        &mut self,
        project: &str,
        rel: &str,
        content: &[u8],
        exec: bool,
    ) -> String {
        let checksum = self.store_object(project, content);
        let entry = format!(
            "[[outputs]]\npath = {rel:?}\nchecksum = {checksum:?}\nsize = {}\nexec = {exec}\n",
            content.len()
        );
        self.manifests.entry(project.to_string()).or_default().push(entry);
        self.flush_manifest(project);
        checksum
    }

    /// Track a directory output at `rel` holding `files` (relative paths
    /// inside the output) without materializing it.
    pub fn track_dir(&mut self, project: &str, rel: &str, files: &[(&str, &[u8])]) {
        let mut entry = format!("[[outputs]]\npath = {rel:?}\n\n[outputs.files]\n");
        for (name, content) in files {
            let checksum = self.store_object(project, content);
            entry.push_str(&format!(
                "{name:?} = {{ checksum = {checksum:?}, size = {} }}\n",
                content.len()
            ));
        }
        self.manifests.entry(project.to_string()).or_default().push(entry);
        self.flush_manifest(project);
    }

    /// Write `content` into the project's object cache, returning its checksum.
    pub fn store_object(&self, project: &str, content: &[u8]) -> String {
        let checksum = compute_bytes_checksum(content);
        let cache = self
            .path(project)
            .join(RepoPath::ManagedDir.as_str())
            .join(RepoPath::Cache.as_str());
        let object = object_path(&cache, &checksum).unwrap();
        let native = object.to_native();
        fs::create_dir_all(native.parent().unwrap()).unwrap();
        fs::write(native, content).unwrap();
        checksum
    }

    fn flush_manifest(&self, project: &str) {
        let entries = self.manifests.get(project).cloned().unwrap_or_default();
        let manifest = self
            .path(project)
            .join(RepoPath::ManagedDir.as_str())
            .join(RepoPath::Manifest.as_str());
        fs::create_dir_all(manifest.parent().unwrap().to_native()).unwrap();
        fs::write(manifest.to_native(), entries.join("\n")).unwrap();
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the repo root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}

fn join_rel(project: &str, rel: &str) -> String {
    if project.is_empty() {
        rel.to_string()
    } else {
        format!("{project}/{rel}")
    }
}
