//! `get`

use colored::Colorize;
use repo_fs::NormalizedPath;
use repo_tree::RepoTree;

use super::display_path;
use crate::error::{CliError, Result};

/// Run the get command
pub fn run_get(tree: &RepoTree, path: &NormalizedPath, dest: &NormalizedPath) -> Result<()> {
    if tree.isdir(path)? {
        return Err(CliError::user(format!(
            "'{}' is a directory; get copies single files",
            display_path(tree, path)
        )));
    }

    let target = if dest.is_dir() {
        match path.file_name() {
            Some(name) => dest.join(name),
            None => dest.clone(),
        }
    } else {
        dest.clone()
    };

    let mut chunks = 0usize;
    let copied = tree.download_with_progress(path, &target, |_| chunks += 1)?;
    tracing::debug!(chunks, "copy finished");
    println!(
        "{} {} -> {} ({} bytes)",
        "Copied".green().bold(),
        display_path(tree, path),
        target,
        copied
    );
    Ok(())
}
