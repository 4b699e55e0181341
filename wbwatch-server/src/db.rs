//! Store queries for users, products and subscriptions

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use wbwatch_common::auth::{generate_salt, hash_password};
use wbwatch_common::db::models::{Account, NewProduct, Product, Subscription};
use wbwatch_common::Result;

// ========================================
// Users
// ========================================

pub async fn find_user(pool: &SqlitePool, username: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT guid, username, password_hash, password_salt, created_at \
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Create the default `admin` account on first start
pub async fn seed_admin(pool: &SqlitePool, password: &str) -> Result<()> {
    if find_user(pool, "admin").await?.is_some() {
        return Ok(());
    }

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) \
         VALUES (?, 'admin', ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(hash)
    .bind(salt)
    .execute(pool)
    .await?;

    info!("Created default 'admin' account");
    Ok(())
}

// ========================================
// Products
// ========================================

/// Atomic upsert keyed by artikul
///
/// The update branch overwrites every mutable field; the existing row's guid
/// survives. Concurrent readers see either the old row or the new one, never
/// a partial write.
pub async fn upsert_product(
    pool: &SqlitePool,
    artikul: &str,
    fields: &NewProduct,
) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (guid, artikul, name, price, rating, total_quantity, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(artikul) DO UPDATE SET
            name = excluded.name,
            price = excluded.price,
            rating = excluded.rating,
            total_quantity = excluded.total_quantity,
            updated_at = CURRENT_TIMESTAMP
        RETURNING guid, artikul, name, price, rating, total_quantity, updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(artikul)
    .bind(&fields.name)
    .bind(fields.price)
    .bind(fields.rating)
    .bind(fields.total_quantity)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn get_product_by_artikul(pool: &SqlitePool, artikul: &str) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT guid, artikul, name, price, rating, total_quantity, updated_at \
         FROM products WHERE artikul = ?",
    )
    .bind(artikul)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

// ========================================
// Subscriptions
// ========================================

pub async fn find_subscription(pool: &SqlitePool, artikul: &str) -> Result<Option<Subscription>> {
    let subscription = sqlx::query_as::<_, Subscription>(
        "SELECT guid, artikul, created_at FROM subscriptions WHERE artikul = ?",
    )
    .bind(artikul)
    .fetch_optional(pool)
    .await?;

    Ok(subscription)
}

pub async fn insert_subscription(pool: &SqlitePool, artikul: &str) -> Result<Subscription> {
    let subscription = sqlx::query_as::<_, Subscription>(
        "INSERT INTO subscriptions (guid, artikul, created_at) \
         VALUES (?, ?, CURRENT_TIMESTAMP) \
         RETURNING guid, artikul, created_at",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(artikul)
    .fetch_one(pool)
    .await?;

    Ok(subscription)
}

pub async fn list_subscriptions(pool: &SqlitePool) -> Result<Vec<Subscription>> {
    let subscriptions = sqlx::query_as::<_, Subscription>(
        "SELECT guid, artikul, created_at FROM subscriptions ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(subscriptions)
}
