//! Generic steerable level walk over anything that can list a directory.

use super::{DirWalk, WalkLevel};
use repo_fs::NormalizedPath;

/// Immediate children of a directory, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

/// Source of directory listings for a [`LevelWalk`].
pub trait ListDir: Send {
    fn list(&self, dir: &NormalizedPath) -> std::io::Result<Listing>;
}

/// Depth-first, top-down walk driven by a [`ListDir`].
///
/// Child directories of the last yielded level are held back until the
/// next call to `next`, so [`DirWalk::steer`] can still rewrite them.
pub struct LevelWalk<L> {
    lister: L,
    stack: Vec<NormalizedPath>,
    pending: Option<(NormalizedPath, Vec<String>)>,
    started: bool,
}

impl<L: ListDir> LevelWalk<L> {
    pub fn new(lister: L, top: NormalizedPath) -> Self {
        Self {
            lister,
            stack: vec![top],
            pending: None,
            started: false,
        }
    }
}

impl<L: ListDir> Iterator for LevelWalk<L> {
    type Item = WalkLevel;

    fn next(&mut self) -> Option<WalkLevel> {
        if let Some((dir, children)) = self.pending.take() {
            self.stack
                .extend(children.iter().rev().map(|name| dir.join(name)));
        }

        let dir = self.stack.pop()?;
        let listing = match self.lister.list(&dir) {
            Ok(listing) => listing,
            Err(e) if !self.started => {
                tracing::debug!(dir = %dir, error = %e, "walk root is not listable");
                self.stack.clear();
                return None;
            }
            Err(e) => {
                // Still yield the level so a paired walk stays aligned
                tracing::warn!(dir = %dir, error = %e, "failed to list directory");
                Listing::default()
            }
        };

        self.started = true;
        self.pending = Some((dir.clone(), listing.dirs.clone()));
        Some(WalkLevel {
            dir,
            dirs: listing.dirs,
            files: listing.files,
        })
    }
}

impl<L: ListDir> DirWalk for LevelWalk<L> {
    fn steer(&mut self, dirs: Vec<String>) {
        if let Some((_, children)) = self.pending.as_mut() {
            *children = dirs;
        }
    }
}
