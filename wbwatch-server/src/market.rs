//! Wildberries card API client
//!
//! Typed view over the card endpoint. Required fields are required in the
//! serde sense too: an upstream document missing one of them is a decode
//! failure surfaced as `MarketError::Parse`, never a panic.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("wbwatch/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Marketplace client errors
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Card endpoint response envelope
#[derive(Debug, Deserialize)]
pub struct CardResponse {
    /// Upstream status; zero means success
    pub state: i64,
    pub data: Option<CardData>,
}

#[derive(Debug, Deserialize)]
pub struct CardData {
    #[serde(default)]
    pub products: Vec<CardProduct>,
}

/// Product attributes as reported by the card endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CardProduct {
    pub name: String,
    /// Price in minor currency units (kopecks)
    #[serde(rename = "salePriceU")]
    pub sale_price_u: i64,
    #[serde(rename = "supplierRating")]
    pub supplier_rating: f64,
    #[serde(rename = "totalQuantity")]
    pub total_quantity: i64,
}

/// Wildberries card API client
pub struct MarketClient {
    http_client: reqwest::Client,
    card_url: String,
}

impl MarketClient {
    /// Create a client for the given card endpoint base URL
    pub fn new(card_url: String) -> Result<Self, MarketError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            card_url,
        })
    }

    /// Fetch the card for an artikul
    ///
    /// `Ok(None)` means the marketplace reports no matching product (non-zero
    /// state or an empty product list).
    pub async fn fetch_card(&self, artikul: &str) -> Result<Option<CardProduct>, MarketError> {
        let url = format!(
            "{}?appType=1&curr=rub&dest=-1257786&spp=30&nm={}",
            self.card_url, artikul
        );

        tracing::debug!(artikul = %artikul, "Querying card endpoint");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MarketError::Api(status.as_u16(), error_text));
        }

        let card: CardResponse = response
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        if card.state != 0 {
            return Ok(None);
        }

        Ok(card.data.and_then(|data| data.products.into_iter().next()))
    }
}
