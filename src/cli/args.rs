//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract translatable messages into XLIFF catalogues
//! - `init`: Initialize a transcat configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Target locale of the generated catalogues (overrides config file)
    #[arg(long)]
    pub locale: Option<String>,

    /// Source code root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Output directory for XLIFF files (overrides config file)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Only dump these domains (default: all extracted domains)
    /// Can be specified multiple times: --domain messages --domain validators
    #[arg(long)]
    pub domain: Vec<String>,

    /// Omit the generation date from the output files
    #[arg(long)]
    pub no_date: bool,

    /// Abort on extraction-argument errors instead of reporting and skipping
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub args: ExtractArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable messages from source files into XLIFF catalogues
    Extract(ExtractCommand),
    /// Initialize a new .transcatrc.json configuration file
    Init,
}
