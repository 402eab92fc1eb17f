//! Producer/consumer workflows: outputs recorded through the public API,
//! then read back through a fresh `RepoTree`.

use pretty_assertions::assert_eq;
use repo_fs::{NormalizedPath, RepoPath};
use repo_git::ScmKind;
use repo_test_utils::TestRepo;
use repo_tree::{
    DirCache, FileEntry, Manifest, OutputDecl, RepoTree, RepoTreeOptions, WalkOptions,
};
use std::collections::BTreeMap;
use std::fs;

/// Store `content` in the project's cache and describe it as a file entry.
fn stash(root: &NormalizedPath, content: &[u8]) -> FileEntry {
    let cache = DirCache::new(
        root.join(RepoPath::ManagedDir.as_str())
            .join(RepoPath::Cache.as_str()),
    );
    FileEntry {
        checksum: cache.insert(content).unwrap(),
        size: content.len() as u64,
        exec: false,
    }
}

#[test]
fn produce_then_consume_outputs() {
    let repo = TestRepo::new();
    let root = repo.root_path().clone();
    fs::create_dir_all(root.join(".artifacts").to_native()).unwrap();

    let mut files = BTreeMap::new();
    files.insert("train.csv".to_string(), stash(&root, b"a,b\n1,2\n"));
    files.insert("splits/test.csv".to_string(), stash(&root, b"a,b\n3,4\n"));
    let manifest = Manifest {
        outputs: vec![
            OutputDecl::directory("dataset", files),
            OutputDecl::file("model.pkl", stash(&root, b"pickle")),
        ],
    };
    manifest.save(&root).unwrap();

    let tree = RepoTree::from_root(&root).unwrap();
    let listed: Vec<String> = tree
        .walk_files(&root, WalkOptions::new())
        .map(|f| f.unwrap().strip_prefix(&root).unwrap().to_string())
        .collect();
    assert_eq!(
        listed,
        vec!["model.pkl", "dataset/train.csv", "dataset/splits/test.csv"]
    );

    let dest = tempfile::tempdir().unwrap();
    let target = NormalizedPath::new(dest.path().join("test.csv"));
    tree.download(&root.join("dataset/splits/test.csv"), &target)
        .unwrap();
    assert_eq!(fs::read_to_string(target.to_native()).unwrap(), "a,b\n3,4\n");
}

#[test]
fn edited_file_takes_precedence_over_output() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.track_file("", "report.txt", b"cached report");

    let tree = RepoTree::from_root(repo.root_path()).unwrap();
    assert_eq!(tree.stat(&repo.path("report.txt")).unwrap().size, 13);

    repo.write("report.txt", "edited");
    assert_eq!(tree.stat(&repo.path("report.txt")).unwrap().size, 6);
    assert!(tree.metadata(&repo.path("report.txt")).unwrap().is_output);
}

#[test]
fn git_revision_flows_to_subprojects() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.init_project("sub");
    repo.write(".artifacts/config.toml", "traverse_subrepos = true\n");
    let commit = repo_test_utils::git::real_git_repo_with_commit(repo.root());

    let tree = RepoTree::from_root(repo.root_path()).unwrap();
    assert_eq!(tree.main_repo().scm().kind(), ScmKind::Git);
    assert_eq!(tree.main_repo().revision(), Some(commit.as_str()));

    let sub = tree.resolve(&repo.path("sub/anything")).unwrap().unwrap();
    assert_eq!(sub.root(), &repo.path("sub"));
    assert_eq!(sub.revision(), Some(commit.as_str()));
}

#[test]
fn git_internals_never_appear_in_walks() {
    let repo = TestRepo::new();
    repo.write("tracked.txt", "t");
    repo_test_utils::git::real_git_repo_with_commit(repo.root());

    let tree = RepoTree::from_root(repo.root_path()).unwrap();
    let files: Vec<String> = tree
        .walk_files(repo.root_path(), WalkOptions::new())
        .map(|f| f.unwrap().file_name().unwrap_or_default().to_string())
        .collect();
    assert_eq!(files, vec!["tracked.txt"]);
}

#[test]
fn options_file_in_another_format() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("opts.yaml", "traverse_subrepos: true\ncopy_buffer_size: 8\n");

    let options = RepoTreeOptions::load(&repo.path("opts.yaml")).unwrap();
    assert!(options.traverse_subrepos);
    assert_eq!(options.copy_buffer_size, 8);
}
