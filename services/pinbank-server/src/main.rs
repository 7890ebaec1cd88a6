//! PinBank API Server
//!
//! Serves the in-memory account ledger over HTTP. The ledger starts empty
//! (or with demo accounts via `--seed`) and is discarded on shutdown.
//!
//! # Usage
//!
//! ```bash
//! # Start on the default port
//! pinbank-server
//!
//! # Demo accounts and strict transfers
//! pinbank-server --seed --require-auth-for-transfer
//!
//! # Environment overrides
//! PINBANK_PORT=9000 pinbank-server
//! ```

use std::sync::Arc;

use clap::Parser;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

use pinbank_api::{create_router, ApiConfig, AppState};
use pinbank_ledger::{Ledger, LedgerConfig};

/// PinBank API Server - account ledger over HTTP
#[derive(Parser, Debug)]
#[command(name = "pinbank-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "PINBANK_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PINBANK_PORT", default_value_t = 8000)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PINBANK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Require the sender's PIN on transfers
    #[arg(long, env = "PINBANK_REQUIRE_AUTH_FOR_TRANSFER")]
    require_auth_for_transfer: bool,

    /// Seed demo accounts (alice/1111 with 100, bob/2222 with 50)
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone())),
        )
        .init();

    let ledger = Ledger::with_config(LedgerConfig {
        require_auth_for_transfer: args.require_auth_for_transfer,
    });

    if args.seed {
        ledger.upsert("alice", "1111", dec!(100)).await?;
        ledger.upsert("bob", "2222", dec!(50)).await?;
        tracing::info!("seeded demo accounts alice and bob");
    }

    let state = Arc::new(AppState::new(ledger));
    let router = create_router(state, ApiConfig::default());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "PinBank API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped; all accounts discarded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
