//! # cvault CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// ChronoVault Stack CLI — condition-gated credential escrow toolchain.
///
/// Runs the escrow/ledger API server and the condition drafting
/// assistant.
#[derive(Parser, Debug)]
#[command(name = "cvault", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the API server.
    Serve(cvault_cli::serve::ServeArgs),
    /// Extract draft conditions from free text.
    Draft(cvault_cli::draft::DraftArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => cvault_cli::serve::run(args).await,
        Commands::Draft(args) => cvault_cli::draft::run(args),
    }
}
