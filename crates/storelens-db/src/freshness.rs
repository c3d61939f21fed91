//! Cache-or-refresh lookup in front of an [`InsightsStore`].
//!
//! A stored record younger than `max_age` is returned as-is. Anything else
//! runs the caller's refresh and writes the result back:
//!
//! ```text
//! ABSENT --refresh--> FRESH --time--> STALE --refresh--> FRESH
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use storelens_core::AggregateRecord;
use thiserror::Error;

use crate::store::{InsightsStore, StoredRecord};
use crate::DbError;

#[derive(Debug, Error)]
pub enum GateError<E> {
    #[error("insights store error: {0}")]
    Store(#[from] DbError),
    #[error("refresh failed: {0}")]
    Refresh(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Served from the store without refreshing.
    Hit,
    /// Address was new; analyzed and inserted.
    Inserted,
    /// Stored record was stale; analyzed and overwritten.
    Refreshed,
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub stored: StoredRecord,
    pub record: AggregateRecord,
    pub outcome: LookupOutcome,
}

/// Serializes lookups per address so that concurrent requests for the same
/// store trigger at most one refresh; later waiters find the fresh row.
pub struct FreshnessGate<S> {
    store: S,
    max_age: Duration,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: InsightsStore> FreshnessGate<S> {
    pub fn new(store: S, max_age: Duration) -> Self {
        Self {
            store,
            max_age,
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the stored record for `target_address` when it is fresh,
    /// otherwise awaits `refresh` and stores its output.
    ///
    /// `target_address` must already be normalized; it is the storage key.
    ///
    /// # Errors
    ///
    /// - [`GateError::Store`] on any store failure, including a stored
    ///   payload that no longer decodes.
    /// - [`GateError::Refresh`] when `refresh` fails; nothing is written.
    pub async fn lookup_or_refresh<F, Fut, E>(
        &self,
        target_address: &str,
        refresh: F,
    ) -> Result<Lookup, GateError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AggregateRecord, E>>,
    {
        let lock = self.address_lock(target_address);
        let result = {
            let _guard = lock.lock().await;
            self.lookup_locked(target_address, refresh).await
        };
        self.release_lock(target_address, lock);
        result
    }

    async fn lookup_locked<F, Fut, E>(
        &self,
        target_address: &str,
        refresh: F,
    ) -> Result<Lookup, GateError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AggregateRecord, E>>,
    {
        let existing = self.store.get(target_address).await?;

        if let Some(stored) = existing.as_ref().filter(|s| self.is_fresh(s)) {
            tracing::info!(address = %target_address, id = stored.id, "serving cached insights");
            return Ok(Lookup {
                record: stored.record()?,
                stored: stored.clone(),
                outcome: LookupOutcome::Hit,
            });
        }

        let outcome = if existing.is_some() {
            LookupOutcome::Refreshed
        } else {
            LookupOutcome::Inserted
        };
        tracing::info!(address = %target_address, ?outcome, "analyzing store");

        let record = refresh().await.map_err(GateError::Refresh)?;
        let stored = self.store.put(target_address, &record).await?;
        Ok(Lookup {
            stored,
            record,
            outcome,
        })
    }

    fn is_fresh(&self, stored: &StoredRecord) -> bool {
        // A timestamp in the future counts as age zero.
        let age = (Utc::now() - stored.updated_at)
            .to_std()
            .unwrap_or_default();
        age < self.max_age
    }

    fn address_lock(&self, target_address: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(target_address.to_owned()).or_default())
    }

    fn release_lock(&self, target_address: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Map entry plus ours: nobody else is waiting.
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(target_address);
        }
    }
}

#[cfg(test)]
#[path = "freshness_test.rs"]
mod tests;
