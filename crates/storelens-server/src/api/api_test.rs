use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::json;
use storelens_core::NoopEnhancer;
use storelens_db::MemoryInsightsStore;
use storelens_scraper::{ClientConfig, StorefrontClient};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn test_state(max_age: Duration) -> AppState<MemoryInsightsStore> {
    let client = StorefrontClient::new(ClientConfig {
        user_agent: "storelens-test/0.1".to_string(),
        request_timeout: Duration::from_secs(5),
        page_timeout: Duration::from_secs(5),
    })
    .expect("client");
    AppState {
        gate: Arc::new(FreshnessGate::new(MemoryInsightsStore::new(), max_age)),
        coordinator: Arc::new(Coordinator::new(client).with_unit_timeout(Duration::from_secs(10))),
        enhancer: Arc::new(BrandEnhancer::Noop(NoopEnhancer)),
        analysis_timeout: Duration::from_secs(30),
        pool: None,
    }
}

async fn storefront() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><title>Mock Store</title></html>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {"id": 1, "title": "Tee", "handle": "tee", "variants": [{"price": "10.00"}]},
                {"id": 2, "title": "Cap", "handle": "cap", "variants": [{"price": "15.00"}]}
            ]
        })))
        .mount(&server)
        .await;
    server
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn analyze_request(website_url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/analyze")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"website_url": website_url, "use_llm": false}).to_string(),
        ))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 200);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("timeout", StatusCode::REQUEST_TIMEOUT),
        ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn analysis_timeout_maps_to_timeout_code() {
    let error = map_analysis_error(
        "req-1".to_string(),
        &AnalysisError::Timeout {
            address: "https://a.example".to_string(),
        },
    );
    assert_eq!(error.error.code, "timeout");
}

#[tokio::test]
async fn analyze_inserts_then_serves_cached_record() {
    let server = storefront().await;
    let app = build_app(test_state(DAY), default_rate_limit_state());

    let (status, first) = send(&app, analyze_request(&server.uri())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["source"], "inserted");
    assert_eq!(first["data"]["insights"]["catalog"].as_array().map(Vec::len), Some(2));
    assert_eq!(first["data"]["insights"]["total_product_count"], 2);
    assert!(first["data"]["insights"]["privacy_policy_text"].is_null());
    assert!(first["meta"]["request_id"].is_string());

    let (status, second) = send(&app, analyze_request(&server.uri())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["source"], "hit");
    assert_eq!(second["data"]["id"], first["data"]["id"]);
    assert_eq!(second["data"]["updated_at"], first["data"]["updated_at"]);
    assert_eq!(second["data"]["insights"], first["data"]["insights"]);
}

#[tokio::test]
async fn stale_record_is_refreshed_with_same_id() {
    let server = storefront().await;
    let app = build_app(test_state(Duration::ZERO), default_rate_limit_state());

    let (_, first) = send(&app, analyze_request(&server.uri())).await;
    let (status, second) = send(&app, analyze_request(&server.uri())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["source"], "refreshed");
    assert_eq!(second["data"]["id"], first["data"]["id"]);
}

#[tokio::test]
async fn analyze_rejects_empty_url() {
    let app = build_app(test_state(DAY), default_rate_limit_state());

    let (status, body) = send(&app, analyze_request("   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn unreachable_store_is_not_found_without_detail() {
    let app = build_app(test_state(DAY), default_rate_limit_state());

    let (status, body) = send(&app, analyze_request("http://127.0.0.1:1")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "website not found or unreachable");
}

#[tokio::test]
async fn whole_call_timeout_maps_to_408() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let mut state = test_state(DAY);
    state.analysis_timeout = Duration::from_millis(300);
    let app = build_app(state, default_rate_limit_state());

    let (status, body) = send(&app, analyze_request(&server.uri())).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"]["code"], "timeout");
}

#[tokio::test]
async fn stores_listing_and_detail_reflect_analysis() {
    let server = storefront().await;
    let app = build_app(test_state(DAY), default_rate_limit_state());
    let (_, analyzed) = send(&app, analyze_request(&server.uri())).await;
    let id = analyzed["data"]["id"].as_i64().expect("id");

    let (status, list) = send(&app, get_request("/api/v1/stores?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = list["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["target_address"], server.uri());
    assert_eq!(rows[0]["total_product_count"], 2);
    assert_eq!(rows[0]["store_name"], "Mock Store");

    let (status, detail) = send(&app, get_request(&format!("/api/v1/stores/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["active"], true);
    assert_eq!(detail["data"]["insights"], analyzed["data"]["insights"]);
}

#[tokio::test]
async fn unknown_store_id_is_404() {
    let app = build_app(test_state(DAY), default_rate_limit_state());

    let (status, body) = send(&app, get_request("/api/v1/stores/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn rate_limited_routes_return_429() {
    let app = build_app(
        test_state(DAY),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (first, _) = send(&app, get_request("/api/v1/stores")).await;
    let (second, body) = send(&app, get_request("/api/v1/stores")).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "rate_limited");
    assert!(body["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn health_reports_missing_database_and_disabled_enhancement() {
    let app = build_app(test_state(DAY), default_rate_limit_state());

    let (status, body) = send(&app, get_request("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "not_configured");
    assert_eq!(body["data"]["enhancement"], "disabled");
}
