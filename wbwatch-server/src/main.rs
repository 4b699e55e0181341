//! wbwatch-server - Wildberries product tracker
//!
//! Fetches product data by artikul, persists it, periodically refreshes
//! subscribed artikuls, and exposes the data through an authenticated HTTP
//! API and a Telegram bot.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wbwatch_common::db::init_database;
use wbwatch_common::Config;
use wbwatch_server::market::MarketClient;
use wbwatch_server::scheduler::RefreshScheduler;
use wbwatch_server::{bot, build_router, db, AppState};

#[derive(Parser, Debug)]
#[command(name = "wbwatch-server", version, about = "Wildberries product tracker service")]
struct Args {
    /// HTTP bind address (overrides WBWATCH_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Store connection string (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting wbwatch-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::load(args.bind.as_deref(), args.database_url.as_deref())?;

    let pool = init_database(&config.database_url).await?;

    // Default account so token issuance works out of the box
    db::seed_admin(&pool, &config.admin_password).await?;

    let market = Arc::new(MarketClient::new(config.card_url.clone())?);
    let scheduler = Arc::new(RefreshScheduler::new(
        pool.clone(),
        market.clone(),
        config.refresh_interval,
    ));

    // One recurring timer per persisted subscription
    let restored = scheduler.reconcile().await?;
    info!("Restored {} subscription timer(s)", restored);

    let cancel = CancellationToken::new();
    let bot_handle = tokio::spawn(bot::run(
        pool.clone(),
        config.bot_token.clone(),
        cancel.clone(),
    ));

    let state = AppState::new(
        pool.clone(),
        market,
        scheduler.clone(),
        config.jwt_secret.clone(),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Timers are cancelled before the pool is released; in-flight upstream
    // calls are abandoned
    cancel.cancel();
    scheduler.shutdown().await;
    let _ = bot_handle.await;
    pool.close().await;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
