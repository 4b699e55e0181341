//! Refresh pipeline
//!
//! The single path both front ends share: fetch an artikul from the
//! marketplace, map the card to the stored record shape, upsert. The
//! on-demand lookup surfaces outcomes to the caller; the periodic tick logs
//! them and never propagates.

use crate::db;
use crate::market::{CardProduct, MarketClient};
use sqlx::SqlitePool;
use tracing::{info, warn};
use wbwatch_common::db::models::{NewProduct, Product};
use wbwatch_common::{Error, Result};

/// Outcome of a single refresh invocation
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Upstream returned a card; the mapped record was persisted
    Updated(Product),
    /// Upstream has no such product; the store was left untouched
    NotFound,
}

/// Map upstream card fields to the stored record shape
///
/// Price converts from minor to major currency units; the other fields pass
/// through.
pub fn map_card(card: &CardProduct) -> NewProduct {
    NewProduct {
        name: card.name.clone(),
        price: card.sale_price_u as f64 / 100.0,
        rating: card.supplier_rating,
        total_quantity: card.total_quantity,
    }
}

/// Fetch `artikul` from the marketplace and upsert the result
pub async fn refresh(
    pool: &SqlitePool,
    market: &MarketClient,
    artikul: &str,
) -> Result<RefreshOutcome> {
    if artikul.trim().is_empty() {
        return Err(Error::InvalidInput("artikul must be non-empty".to_string()));
    }

    let card = market
        .fetch_card(artikul)
        .await
        .map_err(|e| Error::Upstream(e.to_string()))?;

    let Some(card) = card else {
        info!(artikul = %artikul, "Marketplace reports no such product");
        return Ok(RefreshOutcome::NotFound);
    };

    let stored = db::upsert_product(pool, artikul, &map_card(&card)).await?;
    info!(artikul = %artikul, price = stored.price, "Product record refreshed");

    Ok(RefreshOutcome::Updated(stored))
}

/// Periodic-path wrapper
///
/// Outcomes are logged and failures swallowed: a transient not-found or a
/// broken upstream must not abort future scheduled attempts.
pub async fn run_scheduled_refresh(pool: &SqlitePool, market: &MarketClient, artikul: &str) {
    match refresh(pool, market, artikul).await {
        Ok(RefreshOutcome::Updated(_)) => {}
        Ok(RefreshOutcome::NotFound) => {
            info!(artikul = %artikul, "Scheduled refresh skipped: product not found upstream");
        }
        Err(e) => {
            warn!(artikul = %artikul, error = %e, "Scheduled refresh failed");
        }
    }
}
