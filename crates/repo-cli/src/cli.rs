//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// repo-tree - Browse a project's files and tracked outputs as one tree
#[derive(Parser, Debug)]
#[command(name = "repo-tree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest enclosing project)
    #[arg(long, global = true, env = "REPO_TREE_ROOT")]
    pub root: Option<String>,

    /// Options file to use instead of the project's .artifacts/config.toml
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Discover nested projects and show their outputs
    #[arg(long, global = true)]
    pub subrepos: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Walk the merged tree level by level
    ///
    /// Examples:
    ///   repo-tree walk              # Whole project
    ///   repo-tree walk data --all   # Include definition and ignore files
    Walk {
        /// Directory to start from
        #[arg(default_value = ".")]
        path: String,

        /// Include definition and ignore files
        #[arg(short, long)]
        all: bool,

        /// Descend into nested projects as plain directories
        #[arg(long)]
        follow_subrepos: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List every file below a directory
    Ls {
        #[arg(default_value = ".")]
        path: String,

        /// Include definition and ignore files
        #[arg(short, long)]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print a file, from disk or from the object cache
    Cat {
        path: String,
    },

    /// Show what the tree knows about a path
    Stat {
        path: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Copy a file out of the tree
    Get {
        /// Path inside the tree
        path: String,

        /// Local destination
        dest: String,
    },

    /// Show which project owns a path
    Resolve {
        path: String,
    },
}
