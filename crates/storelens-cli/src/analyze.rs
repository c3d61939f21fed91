//! One-shot analysis without persistence.

use std::time::Duration;

use storelens_core::AppConfig;
use storelens_enhance::BrandEnhancer;
use storelens_scraper::{AnalysisError, Coordinator, FailureCategory};

/// Analyze `url` and print the record to stdout.
///
/// The whole run is bounded by the configured analysis timeout.
///
/// # Errors
///
/// Returns an error if the address is invalid, the store is unreachable, the
/// run times out, or the record cannot be serialized.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    url: &str,
    llm: bool,
    compact: bool,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::from_config(config)?;
    let enhancer = BrandEnhancer::from_config(config)?;
    if llm && !enhancer.is_enabled() {
        tracing::warn!("--llm given but GOOGLE_API_KEY is not set; skipping enhancement");
    }
    let hook = (llm && enhancer.is_enabled()).then_some(&enhancer);

    let budget = Duration::from_secs(config.analysis_timeout_secs);
    let record = tokio::time::timeout(budget, coordinator.run(url, hook))
        .await
        .map_err(|_| AnalysisError::Timeout {
            address: url.to_owned(),
        })
        .and_then(|result| result)
        .map_err(|e| anyhow::anyhow!("{}: {e}", category_label(e.category())))?;

    let json = if compact {
        serde_json::to_string(&record)?
    } else {
        serde_json::to_string_pretty(&record)?
    };
    println!("{json}");
    Ok(())
}

fn category_label(category: FailureCategory) -> &'static str {
    match category {
        FailureCategory::NotFound => "not found",
        FailureCategory::Timeout => "timed out",
        FailureCategory::Internal => "internal error",
    }
}
