use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storelens_core::AggregateRecord;
use storelens_db::{GateError, InsightsStore, LookupOutcome};
use storelens_enhance::BrandEnhancer;
use storelens_scraper::{normalize_target_address, AnalysisError};

use crate::middleware::RequestId;

use super::{map_analysis_error, map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    website_url: String,
    #[serde(default)]
    use_llm: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeItem {
    id: i64,
    target_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// `hit`, `inserted` or `refreshed`.
    source: &'static str,
    insights: AggregateRecord,
}

fn outcome_label(outcome: LookupOutcome) -> &'static str {
    match outcome {
        LookupOutcome::Hit => "hit",
        LookupOutcome::Inserted => "inserted",
        LookupOutcome::Refreshed => "refreshed",
    }
}

/// Returns cached insights for the store when fresh; otherwise analyzes it,
/// stores the result, and returns that.
pub(super) async fn analyze_store<S: InsightsStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeItem>>, ApiError> {
    let raw = body.website_url.trim();
    if raw.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "website_url must not be empty",
        ));
    }

    let address = normalize_target_address(raw).map_err(|e| {
        let error = AnalysisError::InvalidAddress {
            address: raw.to_owned(),
            reason: e.to_string(),
        };
        map_analysis_error(req_id.0.clone(), &error)
    })?;

    let hook: Option<&BrandEnhancer> = if body.use_llm && state.enhancer.is_enabled() {
        Some(state.enhancer.as_ref())
    } else {
        if body.use_llm {
            tracing::debug!(address = %address, "enhancement requested but not configured");
        }
        None
    };

    let coordinator = state.coordinator.as_ref();
    let lookup = tokio::time::timeout(
        state.analysis_timeout,
        state
            .gate
            .lookup_or_refresh(&address, || coordinator.run(&address, hook)),
    )
    .await
    .map_err(|_| {
        map_analysis_error(
            req_id.0.clone(),
            &AnalysisError::Timeout {
                address: address.clone(),
            },
        )
    })?
    .map_err(|e| match e {
        GateError::Store(db) => map_db_error(req_id.0.clone(), &db),
        GateError::Refresh(analysis) => map_analysis_error(req_id.0.clone(), &analysis),
    })?;

    Ok(Json(ApiResponse {
        data: AnalyzeItem {
            id: lookup.stored.id,
            target_address: lookup.stored.target_address,
            created_at: lookup.stored.created_at,
            updated_at: lookup.stored.updated_at,
            source: outcome_label(lookup.outcome),
            insights: lookup.record,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
