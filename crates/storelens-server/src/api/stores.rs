use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storelens_core::AggregateRecord;
use storelens_db::InsightsStore;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct StoresQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct StoreSummaryItem {
    id: i64,
    target_address: String,
    store_name: Option<String>,
    last_updated: DateTime<Utc>,
    total_product_count: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct StoreDetailItem {
    id: i64,
    target_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    active: bool,
    insights: AggregateRecord,
}

pub(super) async fn list_stores<S: InsightsStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StoresQuery>,
) -> Result<Json<ApiResponse<Vec<StoreSummaryItem>>>, ApiError> {
    let summaries = state
        .gate
        .store()
        .list_recent(normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = summaries
        .into_iter()
        .map(|summary| StoreSummaryItem {
            id: summary.id,
            target_address: summary.target_address,
            store_name: summary.store_name,
            last_updated: summary.last_updated,
            total_product_count: summary.total_product_count,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_store<S: InsightsStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<StoreDetailItem>>, ApiError> {
    let stored = state
        .gate
        .store()
        .get_by_id(id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "store not found"))?;

    let insights = stored
        .record()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StoreDetailItem {
            id: stored.id,
            target_address: stored.target_address,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            active: stored.active,
            insights,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
