//! CLI argument parsing

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Map the imports of a Python project
#[derive(Parser, Debug)]
#[command(name = "pypeline")]
#[command(about = "Map the imports of a Python project")]
#[command(version)]
pub struct Args {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory and print its import graph
    Open {
        /// Project directory
        path: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Output format (text, json, mermaid, dot)
        #[arg(long)]
        format: Option<String>,

        /// Level strategy (breadth-first, legacy)
        #[arg(long)]
        strategy: Option<String>,
    },

    /// Scan a directory and write its settings file
    Save {
        /// Project directory
        path: PathBuf,

        /// Settings file to write (defaults to one inside the project)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Load a settings file and print its import graph
    Load {
        /// Settings file
        settings: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text, json, mermaid, dot)
        #[arg(long)]
        format: Option<String>,

        /// Level strategy (breadth-first, legacy)
        #[arg(long)]
        strategy: Option<String>,
    },

    /// Edit the notes and to-dos of one file in a settings file
    Annotate {
        /// Settings file
        settings: PathBuf,

        /// File name, without extension
        file: String,

        /// Replace the notes
        #[arg(long)]
        notes: Option<String>,

        /// Add a to-do (can be repeated)
        #[arg(long)]
        todo: Vec<String>,

        /// Mark the to-do at this index done
        #[arg(long)]
        done: Vec<usize>,

        /// Mark the to-do at this index open again
        #[arg(long)]
        undo: Vec<usize>,

        /// Remove the to-do at this index
        #[arg(long)]
        remove: Vec<usize>,
    },

    /// Show version information
    Version,
}
