//! Lazy top-down walk over the union of a working and a managed tree.
//!
//! Each directory is visited once. Its children are partitioned into those
//! present in both trees, those only tracked and those only on disk, and
//! each side's walk is steered so it descends exactly into the children it
//! shares with the merged walk. Nested projects found on the working side
//! are walked with their own tree pair.

use crate::resolver::RepoResolver;
use crate::tree::{DirWalk, WalkLevel};
use crate::{Error, Result};
use repo_fs::{NormalizedPath, is_internal_file};
use std::collections::BTreeSet;

/// Knobs for a merged walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Keep definition and ignore files in file listings
    pub include_internal_files: bool,
    /// Override subrepo traversal for the working-side walk only
    pub follow_subrepos: Option<bool>,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_internal_files(mut self, include: bool) -> Self {
        self.include_internal_files = include;
        self
    }

    pub fn follow_subrepos(mut self, follow: bool) -> Self {
        self.follow_subrepos = Some(follow);
        self
    }
}

/// One merged directory level before it is yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFrame {
    pub dir: NormalizedPath,
    /// Child directories in both trees
    pub shared: Vec<String>,
    /// Child directories only in the managed tree
    pub managed_only: Vec<String>,
    /// Child directories only in the working tree
    pub working_only: Vec<String>,
    /// Union of both trees' files, sorted
    pub files: Vec<String>,
}

impl WalkFrame {
    /// Merge the same level from each side. `None` if both are absent.
    pub fn merge(
        working: Option<WalkLevel>,
        managed: Option<WalkLevel>,
        include_internal_files: bool,
    ) -> Option<Self> {
        let dir = working.as_ref().or(managed.as_ref())?.dir.clone();
        let (working_dirs, working_files) = working.map(|l| (l.dirs, l.files)).unwrap_or_default();
        let (managed_dirs, managed_files) = managed.map(|l| (l.dirs, l.files)).unwrap_or_default();

        let working_dirs: BTreeSet<String> = working_dirs.into_iter().collect();
        let managed_dirs: BTreeSet<String> = managed_dirs.into_iter().collect();
        let files: BTreeSet<String> = managed_files
            .into_iter()
            .chain(working_files)
            .filter(|name| include_internal_files || !is_internal_file(name))
            .collect();

        Some(Self {
            dir,
            shared: working_dirs.intersection(&managed_dirs).cloned().collect(),
            managed_only: managed_dirs.difference(&working_dirs).cloned().collect(),
            working_only: working_dirs.difference(&managed_dirs).cloned().collect(),
            files: files.into_iter().collect(),
        })
    }

    /// All child directories in visiting order.
    pub fn dirs(&self) -> Vec<String> {
        self.shared
            .iter()
            .chain(&self.managed_only)
            .chain(&self.working_only)
            .cloned()
            .collect()
    }

    fn managed_order(&self) -> Vec<String> {
        self.shared.iter().chain(&self.managed_only).cloned().collect()
    }

    fn working_order(&self, subrepos: &BTreeSet<String>) -> Vec<String> {
        self.shared
            .iter()
            .chain(self.working_only.iter().filter(|name| !subrepos.contains(*name)))
            .cloned()
            .collect()
    }

    pub fn into_level(self) -> WalkLevel {
        WalkLevel {
            files: self.files.clone(),
            dirs: self.dirs(),
            dir: self.dir,
        }
    }
}

enum Step {
    /// Pull the next level from each present stream
    Merge {
        working: Option<usize>,
        managed: Option<usize>,
    },
    /// Open the nested project rooted here and walk it
    Subrepo(NormalizedPath),
}

/// Iterator over merged levels. Created by [`crate::RepoTree::walk`].
pub struct MergedWalk<'a> {
    resolver: &'a RepoResolver,
    streams: Vec<Box<dyn DirWalk>>,
    stack: Vec<Step>,
    include_internal_files: bool,
    failed: Option<Error>,
}

impl<'a> MergedWalk<'a> {
    pub(crate) fn new(
        resolver: &'a RepoResolver,
        working: Option<Box<dyn DirWalk>>,
        managed: Option<Box<dyn DirWalk>>,
        include_internal_files: bool,
    ) -> Self {
        let mut walk = Self::empty(resolver);
        walk.include_internal_files = include_internal_files;
        let working = working.map(|s| walk.push_stream(s));
        let managed = managed.map(|s| walk.push_stream(s));
        walk.stack.push(Step::Merge { working, managed });
        walk
    }

    pub(crate) fn empty(resolver: &'a RepoResolver) -> Self {
        Self {
            resolver,
            streams: Vec::new(),
            stack: Vec::new(),
            include_internal_files: false,
            failed: None,
        }
    }

    /// A walk that yields `err` once and ends.
    pub(crate) fn failed(resolver: &'a RepoResolver, err: Error) -> Self {
        let mut walk = Self::empty(resolver);
        walk.failed = Some(err);
        walk
    }

    fn push_stream(&mut self, stream: Box<dyn DirWalk>) -> usize {
        self.streams.push(stream);
        self.streams.len() - 1
    }

    fn open_subrepo(&mut self, dir: &NormalizedPath) -> Result<Step> {
        let pair = self.resolver.tree_pair(dir)?;
        tracing::debug!(root = %pair.repo.root(), "walking into subrepo");
        let working = pair
            .working
            .walk(dir, !self.resolver.traverse_subrepos());
        let working = Some(self.push_stream(working));
        let managed = pair
            .managed
            .as_ref()
            .map(|tree| tree.walk(dir, false))
            .map(|stream| self.push_stream(stream));
        Ok(Step::Merge { working, managed })
    }

    fn merge_level(&mut self, working: Option<usize>, managed: Option<usize>) -> Option<WalkLevel> {
        let managed_level = managed.and_then(|i| self.streams[i].next());
        let working_level = working.and_then(|i| self.streams[i].next());
        // An exhausted side has nothing to offer the subtree
        let managed = managed.filter(|_| managed_level.is_some());
        let working = working.filter(|_| working_level.is_some());

        let frame = WalkFrame::merge(working_level, managed_level, self.include_internal_files)?;
        let subrepos: BTreeSet<String> = frame
            .working_only
            .iter()
            .filter(|name| self.resolver.is_repo_root(&frame.dir.join(name)))
            .cloned()
            .collect();

        if let Some(i) = managed {
            self.streams[i].steer(frame.managed_order());
        }
        if let Some(i) = working {
            self.streams[i].steer(frame.working_order(&subrepos));
        }

        let shared = frame.shared.iter().map(|_| Step::Merge { working, managed });
        let managed_only = frame.managed_only.iter().map(|_| Step::Merge {
            working: None,
            managed,
        });
        let working_only = frame.working_only.iter().map(|name| {
            if subrepos.contains(name) {
                Step::Subrepo(frame.dir.join(name))
            } else {
                Step::Merge {
                    working,
                    managed: None,
                }
            }
        });
        let children: Vec<Step> = shared.chain(managed_only).chain(working_only).collect();
        self.stack.extend(children.into_iter().rev());

        Some(frame.into_level())
    }
}

impl Iterator for MergedWalk<'_> {
    type Item = Result<WalkLevel>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failed.take() {
            return Some(Err(err));
        }
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Subrepo(dir) => match self.open_subrepo(&dir) {
                    Ok(step) => self.stack.push(step),
                    Err(err) => {
                        self.stack.clear();
                        return Some(Err(err));
                    }
                },
                Step::Merge { working, managed } => {
                    if let Some(level) = self.merge_level(working, managed) {
                        return Some(Ok(level));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{ManifestRepoFactory, Repo};
    use crate::tree::LocalTree;
    use pretty_assertions::assert_eq;
    use repo_git::PlainScm;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    fn level(dir: &str, dirs: &[&str], files: &[&str]) -> WalkLevel {
        WalkLevel {
            dir: NormalizedPath::new(dir),
            dirs: dirs.iter().map(|s| s.to_string()).collect(),
            files: files.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn frame_partitions_directories() {
        let frame = WalkFrame::merge(
            Some(level("/r", &["both", "disk"], &["a", "Artifactfile"])),
            Some(level("/r", &["both", "tracked"], &["a", "b"])),
            false,
        )
        .unwrap();

        assert_eq!(frame.shared, names(&["both"]));
        assert_eq!(frame.managed_only, names(&["tracked"]));
        assert_eq!(frame.working_only, names(&["disk"]));
        assert_eq!(frame.files, names(&["a", "b"]));
        assert_eq!(frame.dirs(), names(&["both", "tracked", "disk"]));
    }

    #[test]
    fn frame_keeps_internal_files_on_request() {
        let frame = WalkFrame::merge(
            Some(level("/r", &[], &[".artifactignore", "x.artifact", "x"])),
            None,
            true,
        )
        .unwrap();
        assert_eq!(frame.files, names(&[".artifactignore", "x", "x.artifact"]));
    }

    #[test]
    fn frame_of_nothing_is_none() {
        assert!(WalkFrame::merge(None, None, false).is_none());
    }

    /// In-memory walk over a fixed tree that logs every directory it yields.
    struct ScriptedWalk {
        tree: BTreeMap<String, (Vec<String>, Vec<String>)>,
        stack: Vec<String>,
        pending: Option<(String, Vec<String>)>,
        visited: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedWalk {
        fn new(top: &str, entries: &[(&str, &[&str], &[&str])]) -> (Self, Arc<Mutex<Vec<String>>>) {
            let visited = Arc::new(Mutex::new(Vec::new()));
            let walk = Self {
                tree: entries
                    .iter()
                    .map(|(d, dirs, files)| (d.to_string(), (names(dirs), names(files))))
                    .collect(),
                stack: vec![top.to_string()],
                pending: None,
                visited: Arc::clone(&visited),
            };
            (walk, visited)
        }
    }

    impl Iterator for ScriptedWalk {
        type Item = WalkLevel;

        fn next(&mut self) -> Option<WalkLevel> {
            if let Some((dir, children)) = self.pending.take() {
                self.stack
                    .extend(children.iter().rev().map(|c| format!("{dir}/{c}")));
            }
            let dir = self.stack.pop()?;
            let (dirs, files) = self.tree.get(&dir).cloned().unwrap_or_default();
            self.visited.lock().unwrap().push(dir.clone());
            self.pending = Some((dir.clone(), dirs.clone()));
            Some(WalkLevel {
                dir: NormalizedPath::new(dir),
                dirs,
                files,
            })
        }
    }

    impl DirWalk for ScriptedWalk {
        fn steer(&mut self, dirs: Vec<String>) {
            if let Some((_, children)) = self.pending.as_mut() {
                *children = dirs;
            }
        }
    }

    fn resolver() -> RepoResolver {
        let root = NormalizedPath::new("/r");
        let main = Arc::new(Repo::new(
            root.clone(),
            Arc::new(LocalTree::with_ignore(root.clone(), Default::default())),
            Arc::new(PlainScm::new(root)),
        ));
        RepoResolver::new(main, Arc::new(ManifestRepoFactory), false)
    }

    #[test]
    fn each_side_only_visits_its_own_directories() {
        let (working, working_seen) = ScriptedWalk::new(
            "/r",
            &[
                ("/r", &["both", "disk"], &["w"]),
                ("/r/both", &[], &["bw"]),
                ("/r/disk", &["deep"], &[]),
                ("/r/disk/deep", &[], &["dw"]),
            ],
        );
        let (managed, managed_seen) = ScriptedWalk::new(
            "/r",
            &[
                ("/r", &["both", "tracked"], &["m"]),
                ("/r/both", &[], &["bm"]),
                ("/r/tracked", &[], &["t"]),
            ],
        );
        let resolver = resolver();
        let walk = MergedWalk::new(&resolver, Some(Box::new(working)), Some(Box::new(managed)), false);

        let levels: Vec<(String, Vec<String>)> = walk
            .map(|l| l.unwrap())
            .map(|l| (l.dir.to_string(), l.files))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("/r".to_string(), names(&["m", "w"])),
                ("/r/both".to_string(), names(&["bm", "bw"])),
                ("/r/tracked".to_string(), names(&["t"])),
                ("/r/disk".to_string(), names(&[])),
                ("/r/disk/deep".to_string(), names(&["dw"])),
            ]
        );
        assert_eq!(
            *working_seen.lock().unwrap(),
            names(&["/r", "/r/both", "/r/disk", "/r/disk/deep"])
        );
        assert_eq!(
            *managed_seen.lock().unwrap(),
            names(&["/r", "/r/both", "/r/tracked"])
        );
    }

    #[test]
    fn managed_only_walk() {
        let (managed, _) = ScriptedWalk::new("/r", &[("/r", &["d"], &["f"]), ("/r/d", &[], &["g"])]);
        let resolver = resolver();
        let dirs: Vec<String> = MergedWalk::new(&resolver, None, Some(Box::new(managed)), false)
            .map(|l| l.unwrap().dir.to_string())
            .collect();
        assert_eq!(dirs, names(&["/r", "/r/d"]));
    }

    #[test]
    fn failed_walk_yields_its_error_once() {
        let resolver = resolver();
        let mut walk = MergedWalk::failed(
            &resolver,
            Error::ObjectMissing {
                checksum: "sha256:00".into(),
            },
        );
        assert!(matches!(walk.next(), Some(Err(Error::ObjectMissing { .. }))));
        assert!(walk.next().is_none());
    }
}
