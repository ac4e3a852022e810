//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Nested drag-and-drop list: move items and their subtrees between parents
#[derive(Parser, Debug)]
#[command(name = "nestdnd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .nestdnd.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// TOML seed file (overrides seed_file from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub seed: Option<PathBuf>,

    /// Hide node ids in tree output
    #[arg(long, global = true)]
    pub no_ids: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the list as a tree
    Tree,

    /// Move an item (with its subtree) to become the last child of another
    Move {
        /// Id of the dragged item
        dragged: String,
        /// Id of the drop target
        target: String,
        /// Print the result in seed file format instead of a tree
        #[arg(long)]
        export: bool,
    },

    /// Check whether DESCENDANT lies inside the subtree of ANCESTOR
    Check {
        ancestor: String,
        descendant: String,
    },

    /// Add a new item with a generated id
    Add {
        /// Display label
        label: String,
        /// Parent id (default: append as root)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Interactive drag-and-drop session on stdin
    Session,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,
    /// Show config paths
    Path,
    /// Print a commented config template
    Template,
}
