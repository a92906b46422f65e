//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::application::Format;

/// Rebuild hierarchies from indentation-encoded delimited files and export them as XML or JSON
#[derive(Parser, Debug)]
#[command(name = "tabtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory searched for .tabtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a delimited file to XML or JSON
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "write")]
        output: Option<PathBuf>,

        /// Output format: xml, json or tree (default: from output extension, then config)
        #[arg(short, long)]
        format: Option<Format>,

        /// Write next to the input (or into output_dir) using the format's extension
        #[arg(short, long)]
        write: bool,
    },

    /// Show the reconstructed hierarchy as a tree
    Tree {
        #[command(flatten)]
        input: InputArgs,
    },

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

/// Options describing how the input file is read.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Delimited input file
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Cell delimiter (single character)
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Raw lines to skip at the top of the file
    #[arg(long)]
    pub skip_header: Option<usize>,

    /// Leading columns to skip in every row
    #[arg(long)]
    pub skip_columns: Option<usize>,

    /// Fail on depth-0 rows and depth jumps instead of skipping them
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
