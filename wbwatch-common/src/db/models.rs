//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Account row, used solely to gate API access
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub guid: String,
    pub username: String,
    /// Salted SHA-256 hash, never exposed in JSON
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub created_at: NaiveDateTime,
}

/// Product row, one per artikul; fields reflect the most recent
/// successful fetch only
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub guid: String,
    pub artikul: String,
    pub name: String,
    /// Major currency units (upstream reports minor units)
    pub price: f64,
    pub rating: f64,
    pub total_quantity: i64,
    pub updated_at: NaiveDateTime,
}

/// Mapped upstream fields, ready to upsert into the products table
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub total_quantity: i64,
}

/// Subscription row; uniqueness per artikul is enforced by the subscribe
/// operation, not the storage layer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub guid: String,
    pub artikul: String,
    pub created_at: NaiveDateTime,
}
