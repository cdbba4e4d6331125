//! # `cvault serve` — Run the API Server
//!
//! Boots an in-memory stack (vault manager, ledger, blob store, audit
//! trail) behind the Axum router with request tracing and permissive
//! CORS. State lives for the life of the process; production
//! deployments substitute durable collaborators behind the same traits.

use clap::Args;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cvault_api::{app, AppState};

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind, e.g. 127.0.0.1:8080.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,
}

/// Run the server until interrupted.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState::in_memory();
    let router = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    tracing::info!(addr = %args.addr, "cvault API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
