//! Banter CLI and web chat entry point.
//!
//! Binary name: `banter`
//!
//! Parses CLI arguments, initializes tracing, the database and the
//! completion gateway, then dispatches to a turn admin command or starts
//! the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;

use banter_observe::tracing_setup::{default_filter_for, init_tracing, shutdown_tracing};
use banter_types::turn::TurnFilter;

use cli::{Cli, Commands, TurnsCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.otel, default_filter_for(cli.verbose, cli.quiet))
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");

            tracing::debug!(data_dir = %state.data_dir.display(), "Using data directory");
            let router = http::router::build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!();
                println!(
                    "  {} Banter listening on {}",
                    console::style("▶").green().bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  Press Ctrl+C to stop.");
                println!();
            }
            tracing::info!(%addr, "HTTP server started");

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Turns { command } => match command {
            TurnsCommand::List {
                session,
                search,
                limit,
            } => {
                let filter = TurnFilter {
                    session_id: session,
                    search,
                    limit: Some(limit),
                };
                cli::turns::list_turns(&state, filter, cli.json).await?;
            }
            TurnsCommand::Sessions => {
                cli::turns::list_sessions(&state, cli.json).await?;
            }
            TurnsCommand::Clear { session, force } => {
                cli::turns::clear_session(&state, &session, force, cli.json).await?;
            }
        },
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
