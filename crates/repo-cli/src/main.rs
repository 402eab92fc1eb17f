//! repo-tree CLI
//!
//! Browse a project's working tree and tracked outputs as one tree.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use repo_fs::NormalizedPath;
use repo_tree::{ManifestRepoFactory, RepoTree, RepoTreeOptions};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: could not set up logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command.clone() else {
        println!("{} Browse files and tracked outputs", "repo-tree".green().bold());
        println!();
        println!("Run {} for available commands.", "repo-tree --help".cyan());
        return Ok(());
    };

    let cwd = NormalizedPath::new(std::env::current_dir()?);
    let tree = open_tree(&cli, &cwd)?;
    execute_command(&tree, &cwd, command)
}

fn open_tree(cli: &Cli, cwd: &NormalizedPath) -> Result<RepoTree> {
    let root = context::resolve_root(cli.root.as_deref(), cwd);
    let main = ManifestRepoFactory::open_main(&root)?;

    let mut options = match &cli.config {
        Some(path) => RepoTreeOptions::load(&cwd.join(path))?,
        None => RepoTreeOptions::discover(main.root())?,
    };
    if cli.subrepos {
        options.traverse_subrepos = true;
    }
    tracing::debug!(root = %main.root(), ?options, "opening tree");
    Ok(RepoTree::new(main, options))
}

fn execute_command(tree: &RepoTree, cwd: &NormalizedPath, cmd: Commands) -> Result<()> {
    let at = |path: &str| cwd.join(path);
    match cmd {
        Commands::Walk {
            path,
            all,
            follow_subrepos,
            json,
        } => commands::run_walk(tree, &at(&path), all, follow_subrepos, json),
        Commands::Ls { path, all, json } => commands::run_ls(tree, &at(&path), all, json),
        Commands::Cat { path } => commands::run_cat(tree, &at(&path)),
        Commands::Stat { path, json } => commands::run_stat(tree, &at(&path), json),
        Commands::Get { path, dest } => commands::run_get(tree, &at(&path), &at(&dest)),
        Commands::Resolve { path } => commands::run_resolve(tree, &at(&path)),
    }
}
