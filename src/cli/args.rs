//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `find`: Scan for translatable strings and record new ones in the source table
//! - `trans`: Translate the source table into the target languages
//! - `init`: Write a default `.langsweeprc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::API_KEY_ENV;

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

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Find(cmd)) => cmd.common.verbose,
            Some(Command::Trans(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by `find` and `trans`.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root (default: the directory holding the config file, or the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Process the application
    #[arg(long)]
    pub app: bool,

    /// Process modules: the given comma-separated names, or all when none are given
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub modules: Option<Vec<String>>,

    /// Source language (overrides config file)
    #[arg(long)]
    pub from: Option<String>,

    /// Comma-separated target languages (overrides config file)
    #[arg(long, value_delimiter = ',')]
    pub to: Vec<String>,

    /// API key for the AI provider
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct FindCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Translate the strings after saving them
    #[arg(long)]
    pub trans: bool,
}

#[derive(Debug, Args)]
pub struct TransCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Send one chunk at a time instead of parallel waves
    #[arg(long)]
    pub sequential: bool,

    /// Chunks in flight per wave (overrides config file)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Strings per translator request (overrides config file)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find translatable strings and add new ones to the source-language table
    Find(FindCommand),
    /// Translate the source-language table into the target languages
    Trans(TransCommand),
    /// Initialize a new .langsweeprc.json configuration file
    Init,
}
