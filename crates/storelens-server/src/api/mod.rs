mod analyze;
mod stores;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use storelens_db::{FreshnessGate, InsightsStore};
use storelens_enhance::BrandEnhancer;
use storelens_scraper::{AnalysisError, Coordinator, FailureCategory};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

pub struct AppState<S> {
    pub gate: Arc<FreshnessGate<S>>,
    pub coordinator: Arc<Coordinator>,
    pub enhancer: Arc<BrandEnhancer>,
    /// Whole-call budget for one analysis, cache lookup included.
    pub analysis_timeout: Duration,
    /// Probed by the health endpoint; `None` when running without Postgres.
    pub pool: Option<PgPool>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            coordinator: Arc::clone(&self.coordinator),
            enhancer: Arc::clone(&self.enhancer),
            analysis_timeout: self.analysis_timeout,
            pool: self.pool.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    enhancement: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "timeout" => StatusCode::REQUEST_TIMEOUT,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &storelens_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Maps an analysis failure onto one of three public outcomes. The message
/// never carries the underlying cause.
pub(super) fn map_analysis_error(request_id: String, error: &AnalysisError) -> ApiError {
    match error.category() {
        FailureCategory::NotFound => {
            tracing::info!(error = %error, "store not found");
            ApiError::new(request_id, "not_found", "website not found or unreachable")
        }
        FailureCategory::Timeout => {
            tracing::warn!(error = %error, "analysis timed out");
            ApiError::new(request_id, "timeout", "analysis timed out")
        }
        FailureCategory::Internal => {
            tracing::error!(error = %error, "analysis failed");
            ApiError::new(request_id, "internal_error", "analysis failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn limited_router<S: InsightsStore + 'static>(rate_limit: RateLimitState) -> Router<AppState<S>> {
    Router::new()
        .route("/api/v1/analyze", post(analyze::analyze_store::<S>))
        .route("/api/v1/stores", get(stores::list_stores::<S>))
        .route("/api/v1/stores/{id}", get(stores::get_store::<S>))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app<S: InsightsStore + 'static>(
    state: AppState<S>,
    rate_limit: RateLimitState,
) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health::<S>));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health<S: InsightsStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let enhancement = if state.enhancer.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "not_configured",
                    enhancement,
                },
                meta,
            }),
        );
    };

    match storelens_db::health_check(pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    enhancement,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        enhancement,
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
