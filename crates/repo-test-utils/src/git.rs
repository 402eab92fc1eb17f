//! Git repository fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs;
//! fakes are faster and have fewer external dependencies.

use git2::{Repository, Signature};
use std::fs;
use std::path::Path;

/// Creates a minimal `.git` directory structure **without** initialising a real
/// git repository.
///
/// Realism level: **FAKE**: directory structure only, no git object store.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Initialises a real git repository using `git2` (no initial commit).
///
/// Realism level: **REAL**: valid git object store, empty history.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository with one commit of everything currently
/// in `path`, and returns the commit id.
///
/// Realism level: **REAL WITH HISTORY**.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) -> String {
    let repo = real_git_repo(path);
    let sig = Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: signature: {e}"));

    let tree_id = {
        let mut index = repo
            .index()
            .unwrap_or_else(|e| panic!("real_git_repo_with_commit: index: {e}"));
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap_or_else(|e| panic!("real_git_repo_with_commit: add_all: {e}"));
        index
            .write()
            .unwrap_or_else(|e| panic!("real_git_repo_with_commit: write index: {e}"));
        index
            .write_tree()
            .unwrap_or_else(|e| panic!("real_git_repo_with_commit: write tree: {e}"))
    };
    let tree = repo
        .find_tree(tree_id)
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: find tree: {e}"));

    repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: commit: {e}"))
        .to_string()
}
