//! `walk` and `ls`

use std::io::Write;

use colored::Colorize;
use repo_fs::NormalizedPath;
use repo_tree::{RepoTree, WalkLevel, WalkOptions};
use serde::Serialize;

use super::display_path;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct LevelView {
    dir: String,
    dirs: Vec<String>,
    files: Vec<String>,
}

/// Run the walk command
pub fn run_walk(
    tree: &RepoTree,
    path: &NormalizedPath,
    all: bool,
    follow_subrepos: bool,
    json: bool,
) -> Result<()> {
    let mut options = WalkOptions::new().include_internal_files(all);
    if follow_subrepos {
        options = options.follow_subrepos(true);
    }

    let mut failure = None;
    let walk = tree.walk_or_else(path, options, |err| failure = Some(err));
    if let Some(err) = failure {
        return Err(err.into());
    }

    if json {
        let levels = walk
            .map(|level| level.map(|l| view(tree, l)))
            .collect::<repo_tree::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&levels)?);
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for level in walk {
        let level = level?;
        writeln!(out, "{}", format!("{}/", display_path(tree, &level.dir)).blue().bold())?;
        for dir in &level.dirs {
            writeln!(out, "  {}", format!("{dir}/").blue())?;
        }
        for file in &level.files {
            writeln!(out, "  {file}")?;
        }
    }
    Ok(())
}

fn view(tree: &RepoTree, level: WalkLevel) -> LevelView {
    LevelView {
        dir: display_path(tree, &level.dir),
        dirs: level.dirs,
        files: level.files,
    }
}

/// Run the ls command
pub fn run_ls(tree: &RepoTree, path: &NormalizedPath, all: bool, json: bool) -> Result<()> {
    let options = WalkOptions::new().include_internal_files(all);

    let mut failure = None;
    let walk = tree.walk_or_else(path, options, |err| failure = Some(err));
    if let Some(err) = failure {
        return Err(err.into());
    }

    let mut files = Vec::new();
    for level in walk {
        let level = level?;
        files.extend(
            level
                .files
                .iter()
                .map(|name| display_path(tree, &level.dir.join(name))),
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        let mut out = std::io::stdout().lock();
        for file in files {
            writeln!(out, "{file}")?;
        }
    }
    Ok(())
}
