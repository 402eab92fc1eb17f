//! `stat` and `resolve`

use colored::Colorize;
use repo_fs::NormalizedPath;
use repo_tree::{OutputKind, RepoTree};
use serde::Serialize;

use super::display_path;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct StatView {
    path: String,
    project: String,
    kind: &'static str,
    size: u64,
    exec: bool,
    tracked: bool,
    is_output: bool,
    checksum: Option<String>,
    outputs: Vec<OutputView>,
}

#[derive(Debug, Serialize)]
struct OutputView {
    path: String,
    kind: &'static str,
    size: u64,
}

/// Run the stat command
pub fn run_stat(tree: &RepoTree, path: &NormalizedPath, json: bool) -> Result<()> {
    let meta = tree.metadata(path)?;
    let info = tree.info(path)?;

    let view = StatView {
        path: display_path(tree, path),
        project: display_path(tree, meta.repo.root()),
        kind: if meta.isdir { "directory" } else { "file" },
        size: info.size,
        exec: tree.isexec(path)?,
        tracked: meta.is_tracked(),
        is_output: meta.is_output,
        checksum: info.checksum,
        outputs: meta
            .outs
            .iter()
            .map(|out| OutputView {
                path: display_path(tree, &out.path),
                kind: match out.kind {
                    OutputKind::File(_) => "file",
                    OutputKind::Directory(_) => "directory",
                },
                size: out.size(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}:     {}", "Path".dimmed(), view.path);
    println!("{}:  {}", "Project".dimmed(), view.project);
    println!("{}:     {}", "Kind".dimmed(), view.kind.cyan());
    println!("{}:     {}", "Size".dimmed(), view.size);
    println!("{}:     {}", "Exec".dimmed(), view.exec);
    if let Some(checksum) = &view.checksum {
        println!("{}: {}", "Checksum".dimmed(), checksum);
    }
    if view.outputs.is_empty() {
        println!("{}:  {}", "Tracked".dimmed(), "no".yellow());
    } else {
        for out in &view.outputs {
            println!(
                "{}:  {} ({} output, {} bytes)",
                "Tracked".dimmed(),
                out.path.green(),
                out.kind,
                out.size
            );
        }
    }
    Ok(())
}

/// Run the resolve command
pub fn run_resolve(tree: &RepoTree, path: &NormalizedPath) -> Result<()> {
    let repo = tree
        .resolve(path)?
        .unwrap_or_else(|| tree.main_repo().clone());
    println!("{}", repo.root());
    Ok(())
}
