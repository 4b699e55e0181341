//! Per-subscription refresh timers
//!
//! Explicit reconciliation service holding a mapping from artikul to timer
//! handle, seeded once at startup and mutated only through
//! `register`/`deregister`. Front ends never touch the registry directly.
//!
//! Timer identity is the artikul itself: registering under an existing key
//! replaces the previous timer, so at most one timer exists per artikul.

use crate::market::MarketClient;
use crate::{db, refresh};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use wbwatch_common::Result;

/// Subscription timer registry
pub struct RefreshScheduler {
    db: SqlitePool,
    market: Arc<MarketClient>,
    /// Fixed period shared by all subscriptions
    period: Duration,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(db: SqlitePool, market: Arc<MarketClient>, period: Duration) -> Self {
        Self {
            db,
            market,
            period,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Register one recurring timer per persisted subscription
    ///
    /// Returns the number of active timers afterwards. N stored rows yield
    /// exactly N timers; duplicate artikuls collapse onto one key.
    pub async fn reconcile(&self) -> Result<usize> {
        let subscriptions = db::list_subscriptions(&self.db).await?;
        for subscription in subscriptions {
            self.register(subscription.artikul).await;
        }

        Ok(self.active_count().await)
    }

    /// Register a recurring refresh timer, replacing any existing timer with
    /// the same artikul
    pub async fn register(&self, artikul: String) {
        let pool = self.db.clone();
        let market = self.market.clone();
        let period = self.period;
        let key = artikul.clone();

        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the first
            // refresh lands one full period after registration
            timer.tick().await;

            loop {
                timer.tick().await;
                refresh::run_scheduled_refresh(&pool, &market, &artikul).await;
            }
        });

        let mut timers = self.timers.lock().await;
        if let Some(previous) = timers.insert(key.clone(), handle) {
            previous.abort();
            debug!(artikul = %key, "Replaced existing refresh timer");
        } else {
            debug!(artikul = %key, "Registered refresh timer");
        }
    }

    /// Cancel the timer for an artikul, if any
    ///
    /// Unsubscribe is not exposed yet; this is its scheduler half.
    pub async fn deregister(&self, artikul: &str) -> bool {
        let mut timers = self.timers.lock().await;
        match timers.remove(artikul) {
            Some(handle) => {
                handle.abort();
                debug!(artikul = %artikul, "Deregistered refresh timer");
                true
            }
            None => false,
        }
    }

    /// Number of currently registered timers
    pub async fn active_count(&self) -> usize {
        self.timers.lock().await.len()
    }

    /// Abort every timer without running a final tick
    pub async fn shutdown(&self) {
        let mut timers = self.timers.lock().await;
        let count = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }

        info!("Cancelled {} refresh timer(s)", count);
    }
}
