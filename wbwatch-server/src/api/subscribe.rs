//! Subscription endpoint

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::ApiError;
use crate::{db, AppState};

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: String,
}

/// GET /api/v1/subscribe/:artikul
///
/// A duplicate subscribe request is rejected with 400, not silently
/// accepted.
pub async fn subscribe_product(
    State(state): State<AppState>,
    Path(artikul): Path<String>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    info!(artikul = %artikul, "Subscription requested");

    if db::find_subscription(&state.db, &artikul).await?.is_some() {
        return Err(ApiError::AlreadyExists("Already subscribed".to_string()));
    }

    // Row first, timer second: a failed insert registers no timer, and
    // startup reconciliation heals a crash between the two steps
    let subscription = db::insert_subscription(&state.db, &artikul).await?;
    state.scheduler.register(subscription.artikul).await;

    info!(artikul = %artikul, "Subscription created");

    Ok(Json(SubscribeResponse {
        message: format!("Subscribed to updates for product {artikul}"),
    }))
}
