//! End-to-end scenarios for the merged tree
//!
//! Each test builds a project on disk (working files, manifest, object
//! cache) and queries it only through `RepoTree`.

use pretty_assertions::assert_eq;
use repo_fs::NormalizedPath;
use repo_test_utils::TestRepo;
use repo_tree::{ManifestRepoFactory, RepoTree, RepoTreeOptions, WalkOptions};
use std::io::Read;
use std::sync::Arc;

fn tree(repo: &TestRepo, traverse: bool) -> RepoTree {
    let main = ManifestRepoFactory::open_main(repo.root_path()).unwrap();
    RepoTree::new(main, RepoTreeOptions::default().with_subrepos(traverse))
}

fn rel_levels(
    repo: &TestRepo,
    tree: &RepoTree,
    top: &NormalizedPath,
) -> Vec<(String, Vec<String>, Vec<String>)> {
    tree.walk(top, WalkOptions::new())
        .map(|level| {
            let level = level.unwrap();
            let rel = level.dir.strip_prefix(repo.root_path()).unwrap().to_string();
            (rel, level.dirs, level.files)
        })
        .collect()
}

fn s(items: &[&str]) -> Vec<String> {
    items.iter().map(|i| i.to_string()).collect()
}

/// Working `a.txt` next to an output that was never checked out.
#[test]
fn unmaterialized_output_is_browsable() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("a.txt", "a");
    repo.track_file("", "data/x.bin", b"x-content");
    let tree = tree(&repo, false);

    assert_eq!(
        rel_levels(&repo, &tree, repo.root_path()),
        vec![
            (String::new(), s(&["data"]), s(&["a.txt"])),
            ("data".to_string(), vec![], s(&["x.bin"])),
        ]
    );
    assert!(tree.exists(&repo.path("data/x.bin")).unwrap());
    assert!(!tree.isdir(&repo.path("data/x.bin")).unwrap());
    assert!(tree.isdir(&repo.path("data")).unwrap());
}

#[test]
fn nested_project_is_discovered_lazily() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.init_project("sub");
    repo.write("sub/inner.txt", "inner");
    repo.write("sub/sibling.txt", "sibling");
    let tree = tree(&repo, true);

    assert_eq!(tree.main_repo().root(), repo.root_path());
    let inner = tree.resolve(&repo.path("sub/inner.txt")).unwrap().unwrap();
    assert_eq!(inner.root(), &repo.path("sub"));

    let sibling = tree.resolve(&repo.path("sub/sibling.txt")).unwrap().unwrap();
    assert!(Arc::ptr_eq(&inner, &sibling));
}

#[test]
fn working_directory_shadows_single_file_output() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.track_file("", "out", b"tracked file");
    repo.write("out/generated.txt", "g");
    let tree = tree(&repo, false);

    assert!(tree.isdir(&repo.path("out")).unwrap());
    assert!(tree.metadata(&repo.path("out")).unwrap().isdir);
    assert!(tree.exists(&repo.path("out")).unwrap());
    // The working copy is what open() serves for files inside it
    let mut content = String::new();
    tree.open(&repo.path("out/generated.txt"))
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "g");
}

#[test]
fn walk_files_agree_with_predicates_across_subrepos() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    repo.write("src/lib.rs", "");
    repo.track_dir("", "assets", &[("logo.png", b"png"), ("fonts/a.ttf", b"ttf")]);
    repo.init_project("models");
    repo.track_file("models", "v1/weights.bin", b"w");
    repo.write("models/README.md", "readme");
    let tree = tree(&repo, true);

    let files: Vec<NormalizedPath> = tree
        .walk_files(repo.root_path(), WalkOptions::new())
        .map(Result::unwrap)
        .collect();
    assert_eq!(
        files,
        vec![
            repo.path("assets/logo.png"),
            repo.path("assets/fonts/a.ttf"),
            repo.path("models/README.md"),
            repo.path("models/v1/weights.bin"),
            repo.path("src/lib.rs"),
        ]
    );
    for file in &files {
        assert!(tree.exists(file).unwrap(), "{file}");
        assert!(tree.isfile(file).unwrap(), "{file}");
    }
}

#[test]
fn resolve_is_stable_under_concurrency() {
    let mut repo = TestRepo::new();
    repo.init_project("");
    for name in ["p1", "p2"] {
        repo.init_project(name);
        repo.track_file(name, "out.bin", name.as_bytes());
    }
    let tree = tree(&repo, true);

    let roots: Vec<Vec<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let walked: Vec<String> = tree
                        .walk_files(repo.root_path(), WalkOptions::new())
                        .map(|f| f.unwrap().to_string())
                        .collect();
                    walked
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for walked in &roots {
        assert_eq!(walked, &roots[0]);
    }
    assert_eq!(
        roots[0],
        vec![
            repo.path("p1/out.bin").to_string(),
            repo.path("p2/out.bin").to_string(),
        ]
    );
    let p1 = tree.resolve(&repo.path("p1/out.bin")).unwrap().unwrap();
    let again = tree.resolve(&repo.path("p1")).unwrap().unwrap();
    assert!(Arc::ptr_eq(&p1, &again));
}
