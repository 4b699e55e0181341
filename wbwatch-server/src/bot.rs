//! Telegram bot front end
//!
//! Long-polls getUpdates and answers artikul queries from the product store
//! directly; bot queries never trigger a marketplace refresh. User-facing
//! strings are Russian, matching the shipped product.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::db;
use wbwatch_common::db::models::Product;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

const GREETING: &str = "Привет! Введите артикул товара для получения данных.";
const NOT_FOUND_REPLY: &str = "Товар не найден.";

/// Bot API errors
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Bot API error: {0}")]
    Api(String),
}

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Minimal Telegram Bot API client (getUpdates long polling)
pub struct BotClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl BotClient {
    pub fn new(token: &str) -> Result<Self, BotError> {
        // Long-poll requests stay open for POLL_TIMEOUT_SECS; the transport
        // timeout needs headroom beyond that
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, BotError> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let reply: ApiReply<T> = response
            .json()
            .await
            .map_err(|e| BotError::Api(e.to_string()))?;

        if !reply.ok {
            return Err(BotError::Api(
                reply.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        reply
            .result
            .ok_or_else(|| BotError::Api("empty result".to_string()))
    }

    /// Drop any previous webhook delivery so long polling owns the stream
    pub async fn delete_webhook(&self) -> Result<bool, BotError> {
        self.call(
            "deleteWebhook",
            &[("drop_pending_updates", "true".to_string())],
        )
        .await
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            &[
                ("offset", offset.to_string()),
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ],
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, BotError> {
        self.call(
            "sendMessage",
            &[("chat_id", chat_id.to_string()), ("text", text.to_string())],
        )
        .await
    }
}

/// Bot message loop; runs until the token is cancelled
///
/// Every failure is logged and retried — a broken network or Bot API must
/// not kill the loop.
pub async fn run(pool: SqlitePool, token: String, cancel: CancellationToken) {
    let client = match BotClient::new(&token) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Bot client init failed; chat front end disabled");
            return;
        }
    };

    if let Err(e) = client.delete_webhook().await {
        warn!(error = %e, "deleteWebhook failed");
    }

    info!("Bot polling loop started");

    let mut offset = 0i64;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            result = client.get_updates(offset) => match result {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        if let Some(message) = update.message {
                            handle_message(&pool, &client, &message).await;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed; retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            },
        }
    }

    info!("Bot polling loop stopped");
}

async fn handle_message(pool: &SqlitePool, client: &BotClient, message: &Message) {
    let Some(text) = message.text.as_deref().map(str::trim) else {
        return;
    };
    if text.is_empty() {
        return;
    }

    let reply = if text == "/start" {
        GREETING.to_string()
    } else {
        match db::get_product_by_artikul(pool, text).await {
            Ok(Some(product)) => format_product_reply(&product),
            Ok(None) => NOT_FOUND_REPLY.to_string(),
            Err(e) => {
                warn!(error = %e, "Store read failed for bot query");
                return;
            }
        }
    };

    if let Err(e) = client.send_message(message.chat.id, &reply).await {
        warn!(error = %e, "sendMessage failed");
    }
}

fn format_product_reply(product: &Product) -> String {
    format!(
        "Название: {}\nАртикул: {}\nЦена: {} руб.\nРейтинг: {}\nСуммарное количество: {}\n",
        product.name, product.artikul, product.price, product.rating, product.total_quantity
    )
}
