//! Command-line interface for ticksync
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, SyncConfig};
use crate::error::{Error, Result};
use crate::normalize::NormalizeOptions;

mod init;
mod parse;
mod prompt;
mod sync;

/// ticksync - checklist to kanban board sync
///
/// Reads indented `[ ]`, `[~]` and `[x]` checklist lines from text files and
/// reconciles them with the cards, lists and labels of a Trello board.
#[derive(Parser, Debug)]
#[command(name = "ticksync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to ./.ticksync.toml)
    #[arg(long, global = true, env = "TICKSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Title composition flags shared by `sync` and `parse`
#[derive(Args, Debug, Clone, Default)]
pub struct NormalizeArgs {
    /// Use top-level tasks as labels for their descendants
    #[arg(
        long,
        env = "LABEL_FIRST_LAYER",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub group_by_top_level: Option<bool>,

    /// String placed between nested task titles
    #[arg(long, env = "TODO_SEPARATOR")]
    pub separator: Option<String>,
}

impl NormalizeArgs {
    /// Flags and environment win over the config file.
    pub fn resolve(&self, config: &SyncConfig) -> Result<NormalizeOptions> {
        let mut options = config.normalize_options();
        if let Some(group) = self.group_by_top_level {
            options.group_by_top_level = group;
        }
        if let Some(separator) = &self.separator {
            if separator.is_empty() {
                return Err(Error::InvalidArgument(
                    "--separator cannot be empty".to_string(),
                ));
            }
            options.separator = separator.clone();
        }
        Ok(options)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile checklist files with the board
    Sync {
        /// Checklist files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Board identifier
        #[arg(long, env = "TRELLO_BOARD_ID")]
        board_id: Option<String>,

        /// API key
        #[arg(long, env = "TRELLO_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// API token
        #[arg(long, env = "TRELLO_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,

        #[command(flatten)]
        normalize: NormalizeArgs,

        /// Apply every phase without asking
        #[arg(short, long, conflicts_with = "dry_run")]
        yes: bool,

        /// Show the plan without writing to the board
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse checklist files and print the resulting tasks
    Parse {
        /// Checklist files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        #[command(flatten)]
        normalize: NormalizeArgs,
    },

    /// Write a default .ticksync.toml
    Init {
        /// Board identifier to store in the config
        #[arg(long)]
        board_id: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Sync {
                patterns,
                board_id,
                api_key,
                api_token,
                normalize,
                yes,
                dry_run,
            } => sync::run(sync::SyncCommandOptions {
                patterns,
                board_id,
                api_key,
                api_token,
                normalize,
                yes,
                dry_run,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Parse {
                patterns,
                normalize,
            } => parse::run(parse::ParseOptions {
                patterns,
                normalize,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Init { board_id, force } => init::run(init::InitOptions {
                board_id,
                force,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Load an explicit config file, or `.ticksync.toml` from the working
/// directory when present.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_from_dir(&std::env::current_dir()?),
    }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
