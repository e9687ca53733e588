//! wabridge CLI entry point.
//!
//! Binary name: `wabridge`
//!
//! Parses CLI arguments, initializes tracing, config and the session
//! database, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, SessionCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,wabridge=debug",
        _ => "trace",
    };
    wabridge_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "wabridge", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Reply {
            user_id,
            text,
            name,
        } => {
            cli::reply::reply(&state, &user_id, &text.join(" "), &name, cli.json, cli.quiet).await
        }

        Commands::Session { action } => match action {
            SessionCommand::Show { user_id } => {
                cli::session::show_session(&state, &user_id, cli.json).await
            }
            SessionCommand::List { limit } => {
                cli::session::list_sessions(&state, limit, cli.json).await
            }
        },

        Commands::Provision {
            name,
            instructions,
            model,
            file,
            yes,
        } => {
            let args = cli::provision::ProvisionArgs {
                name,
                instructions,
                model,
                file,
                yes,
            };
            cli::provision::provision(&state, args, cli.json).await
        }

        Commands::Check => cli::check::check(&state, cli.json).await,

        Commands::Completions { .. } => unreachable!("handled above"),
    };

    wabridge_observe::tracing_setup::shutdown_tracing();
    result
}
