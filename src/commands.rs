use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "untitled-folder")]
#[command(about = "Gives untitled files and folders meaningful names", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct Roots {
    /// Directories to scan; overrides `root_paths` from the configuration
    pub roots: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List entries with placeholder names
    Scan(Roots),
    /// Show the proposed new name and confidence for each entry
    Propose(Roots),
    /// Check every proposal for collisions and permissions without renaming
    DryRun {
        #[command(flatten)]
        roots: Roots,
        /// Also write the results as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Rename all entries, rolling everything back if any rename fails
    Apply {
        #[command(flatten)]
        roots: Roots,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Print configuration values
    PrintConfig,
}
