//! Database operations for the `store_insights` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `store_insights` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreInsightsRow {
    pub id: i64,
    pub store_url: String,
    pub store_name: Option<String>,
    /// Serialized `AggregateRecord`.
    pub insights_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Listing projection: no payload, just what a summary view needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreSummaryRow {
    pub id: i64,
    pub store_url: String,
    pub store_name: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub total_product_count: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the row for a normalized store URL, or `None` if never analyzed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_store_insights_by_url(
    pool: &PgPool,
    store_url: &str,
) -> Result<Option<StoreInsightsRow>, DbError> {
    let row = sqlx::query_as::<_, StoreInsightsRow>(
        "SELECT id, store_url, store_name, insights_data, created_at, updated_at, is_active \
         FROM store_insights \
         WHERE store_url = $1",
    )
    .bind(store_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns an active row by id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_store_insights_by_id(
    pool: &PgPool,
    id: i64,
) -> Result<Option<StoreInsightsRow>, DbError> {
    let row = sqlx::query_as::<_, StoreInsightsRow>(
        "SELECT id, store_url, store_name, insights_data, created_at, updated_at, is_active \
         FROM store_insights \
         WHERE id = $1 AND is_active = true",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a row or, when the URL already exists, overwrites its name and
/// payload in place and bumps `updated_at`. `id`, `store_url`, `created_at`
/// and `is_active` are preserved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_store_insights(
    pool: &PgPool,
    store_url: &str,
    store_name: Option<&str>,
    insights_data: &str,
) -> Result<StoreInsightsRow, DbError> {
    let row = sqlx::query_as::<_, StoreInsightsRow>(
        "INSERT INTO store_insights (store_url, store_name, insights_data) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (store_url) DO UPDATE SET \
             store_name = EXCLUDED.store_name, \
             insights_data = EXCLUDED.insights_data, \
             updated_at = NOW() \
         RETURNING id, store_url, store_name, insights_data, created_at, updated_at, is_active",
    )
    .bind(store_url)
    .bind(store_name)
    .bind(insights_data)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recently updated active rows, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_store_insights(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<StoreSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreSummaryRow>(
        "SELECT id, store_url, store_name, updated_at, \
                COALESCE((insights_data::jsonb ->> 'total_product_count')::bigint, 0) \
                    AS total_product_count \
         FROM store_insights \
         WHERE is_active = true \
         ORDER BY updated_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
