//! Storage seam for analyzed records.
//!
//! [`PgInsightsStore`] is the production implementation over the
//! `store_insights` table; [`MemoryInsightsStore`] backs tests and one-shot
//! runs that have no database.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storelens_core::AggregateRecord;

use crate::stores::{
    get_store_insights_by_id, get_store_insights_by_url, list_recent_store_insights,
    upsert_store_insights, StoreInsightsRow, StoreSummaryRow,
};
use crate::DbError;

/// A persisted record. `payload` is the exact text that was stored.
///
/// Inactive rows are still returned by address lookups but are hidden from
/// listing and lookup by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub target_address: String,
    pub store_name: Option<String>,
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

impl StoredRecord {
    /// Decodes the stored payload.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Payload`] if the payload is not a valid record.
    pub fn record(&self) -> Result<AggregateRecord, DbError> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

impl From<StoreInsightsRow> for StoredRecord {
    fn from(row: StoreInsightsRow) -> Self {
        Self {
            id: row.id,
            target_address: row.store_url,
            store_name: row.store_name,
            payload: row.insights_data,
            created_at: row.created_at,
            updated_at: row.updated_at,
            active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub id: i64,
    pub target_address: String,
    pub store_name: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub total_product_count: u64,
}

impl From<StoreSummaryRow> for StoreSummary {
    fn from(row: StoreSummaryRow) -> Self {
        Self {
            id: row.id,
            target_address: row.store_url,
            store_name: row.store_name,
            last_updated: row.updated_at,
            total_product_count: u64::try_from(row.total_product_count).unwrap_or(0),
        }
    }
}

/// Keyed storage of records by normalized target address.
pub trait InsightsStore: Send + Sync {
    fn get(
        &self,
        target_address: &str,
    ) -> impl Future<Output = Result<Option<StoredRecord>, DbError>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = Result<Option<StoredRecord>, DbError>> + Send;

    /// Inserts or overwrites the record for its address. An existing row
    /// keeps its id and gets a new `updated_at`.
    fn put(
        &self,
        target_address: &str,
        record: &AggregateRecord,
    ) -> impl Future<Output = Result<StoredRecord, DbError>> + Send;

    /// Most recently updated records first.
    fn list_recent(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<StoreSummary>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PgInsightsStore {
    pool: PgPool,
}

impl PgInsightsStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl InsightsStore for PgInsightsStore {
    async fn get(&self, target_address: &str) -> Result<Option<StoredRecord>, DbError> {
        let row = get_store_insights_by_url(&self.pool, target_address).await?;
        Ok(row.map(StoredRecord::from))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredRecord>, DbError> {
        let row = get_store_insights_by_id(&self.pool, id).await?;
        Ok(row.map(StoredRecord::from))
    }

    async fn put(
        &self,
        target_address: &str,
        record: &AggregateRecord,
    ) -> Result<StoredRecord, DbError> {
        let payload = serde_json::to_string(record)?;
        let row = upsert_store_insights(
            &self.pool,
            target_address,
            record.store_name.as_deref(),
            &payload,
        )
        .await?;
        Ok(row.into())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<StoreSummary>, DbError> {
        let rows = list_recent_store_insights(&self.pool, limit).await?;
        Ok(rows.into_iter().map(StoreSummary::from).collect())
    }
}

/// Process-local store with the same upsert semantics as the table.
#[derive(Debug, Default)]
pub struct MemoryInsightsStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    rows: BTreeMap<String, StoredRecord>,
}

impl MemoryInsightsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl InsightsStore for MemoryInsightsStore {
    async fn get(&self, target_address: &str) -> Result<Option<StoredRecord>, DbError> {
        Ok(self.with_state(|state| state.rows.get(target_address).cloned()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredRecord>, DbError> {
        Ok(self.with_state(|state| state
                .rows
                .values()
                .find(|row| row.active && row.id == id)
                .cloned()))
    }

    async fn put(
        &self,
        target_address: &str,
        record: &AggregateRecord,
    ) -> Result<StoredRecord, DbError> {
        let payload = serde_json::to_string(record)?;
        let now = Utc::now();
        Ok(self.with_state(|state| {
            if let Some(row) = state.rows.get_mut(target_address) {
                row.store_name.clone_from(&record.store_name);
                row.payload = payload;
                row.updated_at = now;
                return row.clone();
            }
            state.next_id += 1;
            let row = StoredRecord {
                id: state.next_id,
                target_address: target_address.to_owned(),
                store_name: record.store_name.clone(),
                payload,
                created_at: now,
                updated_at: now,
                active: true,
            };
            state.rows.insert(target_address.to_owned(), row.clone());
            row
        }))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<StoreSummary>, DbError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let mut rows = self.with_state(|state| {
            state
                .rows
                .values()
                .filter(|row| row.active)
                .cloned()
                .collect::<Vec<_>>()
        });
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        rows.into_iter()
            .take(limit)
            .map(|row| {
                let record = row.record()?;
                Ok(StoreSummary {
                    id: row.id,
                    target_address: row.target_address,
                    store_name: row.store_name,
                    last_updated: row.updated_at,
                    total_product_count: record.total_product_count,
                })
            })
            .collect()
    }
}
