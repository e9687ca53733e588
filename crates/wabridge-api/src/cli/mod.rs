//! CLI command definitions for the `wabridge` binary.
//!
//! Uses clap derive macros for argument parsing. Each subcommand lives in its
//! own module and receives the wired [`crate::state::AppState`].

pub mod check;
pub mod provision;
pub mod reply;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Relay chat messages to an OpenAI assistant, one thread per user.
#[derive(Parser)]
#[command(name = "wabridge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the assistant's reply to one inbound message.
    Reply {
        /// External user id (e.g. the WhatsApp wa_id).
        user_id: String,

        /// Message text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Display name of the sender, used in logs.
        #[arg(long, default_value = "User")]
        name: String,
    },

    /// Inspect stored user sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Create the remote assistant, optionally with a knowledge file.
    Provision {
        /// Assistant name (defaults to config / ASSISTANT_NAME).
        #[arg(long)]
        name: Option<String>,

        /// System instructions (defaults to config / ASSISTANT_INSTRUCTIONS).
        #[arg(long)]
        instructions: Option<String>,

        /// Model (defaults to config / ASSISTANT_MODEL).
        #[arg(long)]
        model: Option<String>,

        /// Knowledge file to upload and attach for file search.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Skip interactive prompts.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show configuration and validate the configured assistant.
    Check,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the session mapped to a user.
    Show {
        /// External user id.
        user_id: String,
    },

    /// List stored sessions, most recently used first.
    #[command(alias = "ls")]
    List {
        /// Maximum number of sessions to show.
        #[arg(long, short = 'n')]
        limit: Option<i64>,
    },
}
