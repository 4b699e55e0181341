//! wbwatch-server library - Wildberries product tracker service
//!
//! One process hosting three independently scheduled front ends over a
//! shared store: the authenticated HTTP API, the per-subscription refresh
//! timers, and the Telegram bot loop.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod bot;
pub mod db;
pub mod market;
pub mod refresh;
pub mod scheduler;

use market::MarketClient;
use scheduler::RefreshScheduler;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Marketplace card client
    pub market: Arc<MarketClient>,
    /// Per-subscription timer registry
    pub scheduler: Arc<RefreshScheduler>,
    /// Token-signing secret
    pub jwt_secret: String,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        market: Arc<MarketClient>,
        scheduler: Arc<RefreshScheduler>,
        jwt_secret: String,
    ) -> Self {
        Self {
            db,
            market,
            scheduler,
            jwt_secret,
        }
    }
}

/// Build application router
///
/// Product and subscription endpoints require a bearer token; token issuance
/// and the health endpoint do not.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/products/:artikul", get(api::get_product))
        .route("/api/v1/subscribe/:artikul", get(api::subscribe_product))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/token", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
