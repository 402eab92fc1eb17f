//! Tests for the merged walk over working and managed trees

use pretty_assertions::assert_eq;
use repo_fs::NormalizedPath;
use repo_test_utils::TestRepo;
use repo_tree::{Error, RepoTree, RepoTreeOptions, WalkLevel, WalkOptions};
use std::cell::RefCell;

fn open(repo: &TestRepo, traverse: bool) -> RepoTree {
    let main = repo_tree::ManifestRepoFactory::open_main(repo.root_path()).unwrap();
    RepoTree::new(main, RepoTreeOptions::default().with_subrepos(traverse))
}

/// `(relative dir, dirs, files)` for every level, for compact assertions.
fn summarize(
    repo: &TestRepo,
    levels: impl Iterator<Item = repo_tree::Result<WalkLevel>>,
) -> Vec<(String, Vec<String>, Vec<String>)> {
    levels
        .map(|level| {
            let level = level.unwrap();
            let rel = level
                .dir
                .strip_prefix(repo.root_path())
                .unwrap_or(level.dir.as_str())
                .to_string();
            (rel, level.dirs, level.files)
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn managed_only_output_appears_in_walk() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("a.txt", "a");
    repo.track_file("", "data/x.bin", b"xyz");
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(repo.root_path(), WalkOptions::new()));
    assert_eq!(
        levels,
        vec![
            (String::new(), strings(&["data"]), strings(&["a.txt"])),
            ("data".to_string(), vec![], strings(&["x.bin"])),
        ]
    );
    assert!(tree.exists(&repo.path("data/x.bin")).unwrap());
    assert!(!tree.isdir(&repo.path("data/x.bin")).unwrap());
}

#[test]
fn shared_directories_appear_once() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("data/local.csv", "l");
    repo.track_file("", "data/x.bin", b"xyz");
    repo.write("data/x.bin", "xyz");
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(repo.root_path(), WalkOptions::new()));
    assert_eq!(
        levels,
        vec![
            (String::new(), strings(&["data"]), vec![]),
            ("data".to_string(), vec![], strings(&["local.csv", "x.bin"])),
        ]
    );
}

#[test]
fn partition_order_is_shared_then_managed_then_working() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("both/w.txt", "w");
    repo.track_file("", "both/m.bin", b"m");
    repo.track_dir("", "tracked", &[("t.bin", b"t"), ("sub/u.bin", b"u")]);
    repo.write("disk/deep/d.txt", "d");
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(repo.root_path(), WalkOptions::new()));
    insta::assert_debug_snapshot!(levels, @r#"
    [
        (
            "",
            [
                "both",
                "tracked",
                "disk",
            ],
            [],
        ),
        (
            "both",
            [],
            [
                "m.bin",
                "w.txt",
            ],
        ),
        (
            "tracked",
            [
                "sub",
            ],
            [
                "t.bin",
            ],
        ),
        (
            "tracked/sub",
            [],
            [
                "u.bin",
            ],
        ),
        (
            "disk",
            [
                "deep",
            ],
            [],
        ),
        (
            "disk/deep",
            [],
            [
                "d.txt",
            ],
        ),
    ]
    "#);
}

#[test]
fn internal_files_are_hidden_by_default() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("artifacts.yaml", "stages: {}");
    repo.write("model.bin.artifact", "outs: []");
    repo.write("Artifactfile", "");
    repo.write_ignore("", &["*.tmp"]);
    repo.write("keep.txt", "k");
    let tree = open(&repo, false);

    let root = tree
        .walk(repo.root_path(), WalkOptions::new())
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(root.files, strings(&["keep.txt"]));

    let root = tree
        .walk(repo.root_path(), WalkOptions::new().include_internal_files(true))
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(
        root.files,
        strings(&[
            ".artifactignore",
            "Artifactfile",
            "artifacts.yaml",
            "keep.txt",
            "model.bin.artifact",
        ])
    );
}

#[test]
fn materialized_output_root_is_walked_from_disk_only() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.track_dir("", "models", &[("a.bin", b"a"), ("b.bin", b"b")]);
    repo.write("models/a.bin", "a");
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(&repo.path("models"), WalkOptions::new()));
    assert_eq!(levels, vec![("models".to_string(), vec![], strings(&["a.bin"]))]);
}

#[test]
fn absent_working_root_walks_managed_tree() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.track_dir("", "models", &[("a.bin", b"a"), ("v1/b.bin", b"b")]);
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(&repo.path("models"), WalkOptions::new()));
    assert_eq!(
        levels,
        vec![
            ("models".to_string(), strings(&["v1"]), strings(&["a.bin"])),
            ("models/v1".to_string(), vec![], strings(&["b.bin"])),
        ]
    );
}

#[test]
fn missing_top_reports_through_callback() {
    let repo = TestRepo::new();
    let tree = open(&repo, false);
    let seen = RefCell::new(None);

    let count = tree
        .walk_or_else(&repo.path("missing"), WalkOptions::new(), |err| {
            *seen.borrow_mut() = Some(err)
        })
        .count();

    assert_eq!(count, 0);
    assert!(matches!(seen.into_inner(), Some(Error::NotFound { .. })));
    assert_eq!(tree.walk(&repo.path("missing"), WalkOptions::new()).count(), 0);
}

#[test]
fn file_top_is_not_a_directory() {
    let repo = TestRepo::new();
    repo.write("file.txt", "f");
    let tree = open(&repo, false);
    let seen = RefCell::new(None);

    let count = tree
        .walk_or_else(&repo.path("file.txt"), WalkOptions::new(), |err| {
            *seen.borrow_mut() = Some(err)
        })
        .count();

    assert_eq!(count, 0);
    assert!(matches!(seen.into_inner(), Some(Error::NotADirectory { .. })));
}

fn repo_with_subproject() -> TestRepo {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("top.txt", "t");
    repo.init_project("sub");
    repo.write("sub/inner.txt", "i");
    repo.track_file("sub", "out/model.bin", b"weights");
    repo
}

#[test]
fn subrepos_are_walked_with_their_own_trees() {
    let repo = repo_with_subproject();
    let tree = open(&repo, true);

    let levels = summarize(&repo, tree.walk(repo.root_path(), WalkOptions::new()));
    assert_eq!(
        levels,
        vec![
            (String::new(), strings(&["sub"]), strings(&["top.txt"])),
            ("sub".to_string(), strings(&["out"]), strings(&["inner.txt"])),
            ("sub/out".to_string(), vec![], strings(&["model.bin"])),
        ]
    );
    assert!(tree.isfile(&repo.path("sub/out/model.bin")).unwrap());
}

#[test]
fn subrepos_are_skipped_without_traversal() {
    let repo = repo_with_subproject();
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(repo.root_path(), WalkOptions::new()));
    assert_eq!(levels, vec![(String::new(), vec![], strings(&["top.txt"]))]);
}

#[test]
fn follow_subrepos_overrides_working_walk_only() {
    let repo = repo_with_subproject();
    let tree = open(&repo, false);

    // Descends into sub as plain working content; its outputs stay hidden
    let levels = summarize(
        &repo,
        tree.walk(repo.root_path(), WalkOptions::new().follow_subrepos(true)),
    );
    assert_eq!(
        levels,
        vec![
            (String::new(), strings(&["sub"]), strings(&["top.txt"])),
            ("sub".to_string(), vec![], strings(&["inner.txt"])),
        ]
    );
}

#[test]
fn walk_files_yields_existing_files() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("src/main.rs", "fn main() {}");
    repo.track_file("", "data/x.bin", b"xyz");
    repo.track_dir("", "models", &[("v1/w.bin", b"w")]);
    let tree = open(&repo, false);

    let files: Vec<NormalizedPath> = tree
        .walk_files(repo.root_path(), WalkOptions::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        files,
        vec![
            repo.path("data/x.bin"),
            repo.path("models/v1/w.bin"),
            repo.path("src/main.rs"),
        ]
    );
    for file in &files {
        assert!(tree.isfile(file).unwrap(), "{file} should be a file");
        assert!(tree.exists(file).unwrap(), "{file} should exist");
    }
}

#[test]
fn walk_files_keeps_cached_entries_of_a_partly_checked_out_output() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.track_dir("", "models", &[("a.bin", b"a"), ("b.bin", b"b")]);
    repo.write("models/a.bin", "a");
    let tree = open(&repo, false);

    let files: Vec<NormalizedPath> = tree
        .walk_files(repo.root_path(), WalkOptions::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(files, vec![repo.path("models/a.bin"), repo.path("models/b.bin")]);

    // The output root is on disk, so the cached half is shadowed for lookups
    let missing = repo.path("models/b.bin");
    assert!(!tree.exists(&missing).unwrap());
    assert!(!tree.isfile(&missing).unwrap());
    assert!(tree.isfile(&repo.path("models/a.bin")).unwrap());
}

#[test]
fn file_output_replaced_by_directory_is_listed_as_both() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.track_file("", "out", b"cached");
    repo.write("out/inner.txt", "i");
    let tree = open(&repo, false);

    let levels = summarize(&repo, tree.walk(repo.root_path(), WalkOptions::new()));
    assert_eq!(
        levels,
        vec![
            (String::new(), strings(&["out"]), strings(&["out"])),
            ("out".to_string(), vec![], strings(&["inner.txt"])),
        ]
    );

    let out = repo.path("out");
    assert!(tree.exists(&out).unwrap());
    assert!(tree.isdir(&out).unwrap());
    assert!(!tree.isfile(&out).unwrap());
}

#[test]
fn walk_stops_when_consumer_stops() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    for i in 0..20 {
        repo.write(&format!("d{i:02}/f.txt"), "f");
    }
    let tree = open(&repo, false);

    let first_two: Vec<WalkLevel> = tree
        .walk(repo.root_path(), WalkOptions::new())
        .take(2)
        .map(Result::unwrap)
        .collect();
    assert_eq!(first_two[1].dir, repo.path("d00"));
}
