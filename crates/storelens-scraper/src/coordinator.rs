//! Fan-out of the seven extractor units over one storefront.

use std::sync::Arc;
use std::time::Duration;

use storelens_core::{AggregateRecord, AppConfig, Enhancer, NoopEnhancer};
use tokio::task::JoinSet;

use crate::client::{normalize_target_address, ClientConfig, StorefrontClient};
use crate::error::{AnalysisError, ScraperError};
use crate::heuristics::{ContactParser, FaqParser, MarkupFaqParser, PatternContactParser};
use crate::merge::merge;
use crate::units::{self, ExtractorResult, UnitContext, UnitKind};

const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_ITEM_CONCURRENCY: usize = 4;

/// Runs every extractor unit concurrently against one store and merges the
/// outcomes.
///
/// The root page is fetched once up front and shared read-only with the
/// units that scan it. A transport failure on that fetch is the only way a
/// run fails after its address has been accepted; an HTTP error status on the
/// root page only fails the units that read it.
pub struct Coordinator {
    client: StorefrontClient,
    unit_timeout: Duration,
    item_concurrency: usize,
    contact_parser: Arc<dyn ContactParser>,
    faq_parser: Arc<dyn FaqParser>,
}

impl Coordinator {
    #[must_use]
    pub fn new(client: StorefrontClient) -> Self {
        Self {
            client,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            item_concurrency: DEFAULT_ITEM_CONCURRENCY,
            contact_parser: Arc::new(PatternContactParser),
            faq_parser: Arc::new(MarkupFaqParser),
        }
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = StorefrontClient::new(ClientConfig::from_app_config(config))?;
        Ok(Self::new(client)
            .with_unit_timeout(Duration::from_secs(config.unit_timeout_secs))
            .with_item_concurrency(config.scraper_item_concurrency))
    }

    #[must_use]
    pub fn with_unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_item_concurrency(mut self, concurrency: usize) -> Self {
        self.item_concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_heuristics(
        mut self,
        contact_parser: Arc<dyn ContactParser>,
        faq_parser: Arc<dyn FaqParser>,
    ) -> Self {
        self.contact_parser = contact_parser;
        self.faq_parser = faq_parser;
        self
    }

    /// Analyzes `target` and applies `hook` to the merged record, if given.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidAddress`] when `target` cannot be normalized.
    /// - [`AnalysisError::Unreachable`] when the root page cannot be fetched
    ///   at the transport level.
    pub async fn run<H: Enhancer>(
        &self,
        target: &str,
        hook: Option<&H>,
    ) -> Result<AggregateRecord, AnalysisError> {
        let origin =
            normalize_target_address(target).map_err(|e| AnalysisError::InvalidAddress {
                address: target.to_owned(),
                reason: e.to_string(),
            })?;

        let root = self
            .client
            .fetch_root(&origin)
            .await
            .map_err(|source| AnalysisError::Unreachable {
                address: origin.clone(),
                source,
            })?;
        if !root.is_success() {
            tracing::warn!(origin = %origin, status = root.status, "root page returned an error status");
        }

        let ctx = Arc::new(UnitContext {
            client: self.client.clone(),
            origin: origin.clone(),
            root,
            item_concurrency: self.item_concurrency,
            contact_parser: Arc::clone(&self.contact_parser),
            faq_parser: Arc::clone(&self.faq_parser),
        });

        let results = self.run_units(ctx).await;
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(origin = %origin, succeeded, failed = results.len() - succeeded, "extraction finished");

        let record = merge(&origin, results);
        Ok(match hook {
            Some(hook) => hook.enhance(record).await,
            None => record,
        })
    }

    /// [`Self::run`] without an enhancement hook.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`].
    pub async fn run_plain(&self, target: &str) -> Result<AggregateRecord, AnalysisError> {
        self.run::<NoopEnhancer>(target, None).await
    }

    /// Spawns all units and waits for every one to reach a terminal state.
    ///
    /// Always returns exactly one result per [`UnitKind`], in `UnitKind`
    /// order. A unit that exceeds its budget or whose task dies becomes a
    /// failure. Dropping the returned future aborts the remaining tasks.
    async fn run_units(&self, ctx: Arc<UnitContext>) -> Vec<ExtractorResult> {
        let budget = self.unit_timeout;
        let mut tasks = JoinSet::new();
        for kind in UnitKind::ALL {
            let ctx = Arc::clone(&ctx);
            tasks.spawn(async move {
                match tokio::time::timeout(budget, units::run(kind, &ctx)).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(unit = %kind, origin = %ctx.origin, "extractor unit timed out");
                        ExtractorResult::Failure {
                            unit: kind,
                            reason: format!("timed out after {}s", budget.as_secs()),
                        }
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(UnitKind::ALL.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(error = %e, "extractor task did not complete"),
            }
        }

        for kind in UnitKind::ALL {
            if !results.iter().any(|r| r.unit() == kind) {
                results.push(ExtractorResult::Failure {
                    unit: kind,
                    reason: "task did not complete".to_owned(),
                });
            }
        }
        results.sort_by_key(ExtractorResult::unit);
        results
    }
}
