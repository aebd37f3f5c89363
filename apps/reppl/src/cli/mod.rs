//! # reppl CLI Module
//!
//! This module implements the CLI interface for reppl.
//!
//! ## Available Commands
//!
//! - `init` - Create an empty project file
//! - `put hash` - Bind a tag to a ware by hand
//! - `unset` - Remove a tag
//! - `show` - Show tags and store counts
//! - `eval` - Evaluate a formula, reusing recorded results when possible

mod commands;

use clap::{Parser, Subcommand};
use reppl_core::ReppError;
use std::path::PathBuf;

use crate::config::Config;
pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// reppl - memoized formula evaluation
///
/// Pins a formula's inputs to content hashes, skips execution when the
/// result is already on record, and keeps tagged results in a project file.
#[derive(Parser, Debug)]
#[command(name = "reppl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the project file [env: REPPL_PROJECT] [default: .reppl]
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Engine command; the pin file path is appended [env: REPPL_ENGINE]
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty project file
    Init {
        /// Overwrite an existing project file
        #[arg(short, long)]
        force: bool,
    },

    /// Bind a tag by hand
    Put {
        #[command(subcommand)]
        what: PutCommand,
    },

    /// Remove a tag
    Unset {
        /// Tag to remove
        tag: String,
    },

    /// Show tags and store counts
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a formula
    Eval {
        /// Formula file (YAML)
        formula: PathBuf,

        /// Evaluate even if results are on record
        #[arg(short, long)]
        force: bool,

        /// Set an action environment variable
        #[arg(short, long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,
    },
}

/// What `put` binds.
#[derive(Subcommand, Debug)]
pub enum PutCommand {
    /// Bind a tag to a literal content hash
    Hash {
        /// Tag name
        tag: String,

        /// Content hash
        hash: String,

        /// Ware type
        #[arg(short, long, default_value = "tar")]
        kind: String,

        /// Known location of the ware (repeatable)
        #[arg(short, long)]
        warehouse: Vec<String>,
    },
}

/// Process exit status for any error.
pub const ERROR_EXIT_CODE: u8 = 2;

/// How a successful command invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Done; exit 0.
    Done,
    /// The evaluated action failed; exit 1.
    ActionFailed,
}

impl Completion {
    /// Process exit status for this completion.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Done => 0,
            Self::ActionFailed => 1,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<Completion, ReppError> {
    let config = Config::load(cli.project, cli.engine)?;
    tracing::debug!(project = %config.project.display(), engine = ?config.engine, "configuration");

    match cli.command {
        Commands::Init { force } => cmd_init(&config.project, force),
        Commands::Put {
            what:
                PutCommand::Hash {
                    tag,
                    hash,
                    kind,
                    warehouse,
                },
        } => cmd_put_hash(&config.project, &tag, &hash, &kind, &warehouse),
        Commands::Unset { tag } => cmd_unset(&config.project, &tag),
        Commands::Show { json } => cmd_show(&config.project, json),
        Commands::Eval { formula, force, env } => cmd_eval(&config, formula, force, env).await,
    }
}
