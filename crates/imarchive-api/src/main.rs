//! imarchive CLI entry point.
//!
//! Binary name: `imarc`
//!
//! Parses CLI arguments, opens the Messages store read-only, then dispatches
//! to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use imarchive_observe::tracing_setup;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_setup::filter_for_verbosity(cli.verbose, cli.quiet);
    tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need a database
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "imarc", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.db.clone()).await?;
    tracing::debug!(path = %state.database_path.display(), "archive ready");

    let result = run(&state, cli.command, cli.json).await;

    state.shutdown().await;
    tracing_setup::shutdown_tracing();
    result
}

async fn run(state: &AppState, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Chats { limit } => cli::chat::list_chats(state, limit, json).await,
        Commands::Messages {
            chat_id,
            limit,
            offset,
        } => cli::message::show_messages(state, chat_id, limit, offset, json).await,
        Commands::Search { term, limit } => cli::search::search(state, &term, limit, json).await,
        Commands::Around {
            chat_id,
            message_id,
            width,
        } => cli::message::show_around(state, chat_id, message_id, width, json).await,
        Commands::Schema => cli::schema::show_schema(state, json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
