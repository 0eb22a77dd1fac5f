//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use clap_complete::Shell;

use crate::config::RenderStyle;

/// Assembly structure trees with shared, reference-counted parts
#[derive(Parser, Debug)]
#[command(name = "bomtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Settings file, layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print shell completions
    #[arg(long = "generate", value_enum)]
    pub generator: Option<Shell>,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the sample assembly, print it, tear it down
    Demo {
        /// Output style (overrides settings)
        #[arg(short, long, value_enum)]
        style: Option<RenderStyle>,

        /// Skip the link report
        #[arg(long)]
        no_links: bool,
    },

    /// Show effective settings
    Config,
}
