//! The optional post-merge enhancement hook.

use std::future::Future;

use crate::insights::AggregateRecord;

/// A transformation applied to a merged [`AggregateRecord`] before it is
/// returned or stored.
///
/// Implementations must be total: any internal failure falls back to the
/// input record (or a partial improvement of it) instead of surfacing an
/// error.
pub trait Enhancer: Send + Sync {
    fn enhance(&self, record: AggregateRecord) -> impl Future<Output = AggregateRecord> + Send;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnhancer;

impl Enhancer for NoopEnhancer {
    async fn enhance(&self, record: AggregateRecord) -> AggregateRecord {
        record
    }
}
