//! `cat`

use std::io::{Read, Write};

use repo_fs::NormalizedPath;
use repo_tree::RepoTree;

use crate::error::Result;

/// Run the cat command
pub fn run_cat(tree: &RepoTree, path: &NormalizedPath) -> Result<()> {
    let mut reader = tree.open(path)?;
    let mut out = std::io::stdout().lock();
    let mut buffer = vec![0u8; tree.options().copy_buffer_size.max(1)];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        out.write_all(&buffer[..n])?;
    }
    out.flush()?;
    Ok(())
}
