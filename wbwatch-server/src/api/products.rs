//! On-demand product lookup
//!
//! "Get" is "get-and-refresh": every lookup fetches the marketplace and
//! upserts the result into the store before answering, even when a stored
//! record already exists.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use wbwatch_common::db::models::Product;

use super::ApiError;
use crate::refresh::{self, RefreshOutcome};
use crate::AppState;

/// Product view returned to API callers
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub artikul: String,
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub total_quantity: i64,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            artikul: product.artikul,
            name: product.name,
            price: product.price,
            rating: product.rating,
            total_quantity: product.total_quantity,
        }
    }
}

/// GET /api/v1/products/:artikul
pub async fn get_product(
    State(state): State<AppState>,
    Path(artikul): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    info!(artikul = %artikul, "Product lookup requested");

    match refresh::refresh(&state.db, &state.market, &artikul).await? {
        RefreshOutcome::Updated(product) => Ok(Json(product.into())),
        RefreshOutcome::NotFound => Err(ApiError::NotFound("Product not found".to_string())),
    }
}
