//! Live integration tests for storelens-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/storelens-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use std::time::Duration;

use storelens_core::AggregateRecord;
use storelens_db::{
    get_store_insights_by_id, list_recent_store_insights, upsert_store_insights, FreshnessGate,
    InsightsStore, LookupOutcome, PgInsightsStore,
};

fn record(address: &str, products: u64) -> AggregateRecord {
    let mut record = AggregateRecord::new(address);
    record.store_name = Some(format!("Store {products}"));
    record.total_product_count = products;
    record
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_overwrites_payload_and_preserves_identity(pool: sqlx::PgPool) {
    let first = upsert_store_insights(&pool, "https://a.example", Some("A"), r#"{"v":1}"#)
        .await
        .expect("first upsert");
    let second = upsert_store_insights(&pool, "https://a.example", Some("A2"), r#"{"v":2}"#)
        .await
        .expect("second upsert");

    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.insights_data, r#"{"v":2}"#);
    assert_eq!(second.store_name.as_deref(), Some("A2"));
    assert!(second.is_active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn listing_skips_inactive_rows_and_reads_product_count(pool: sqlx::PgPool) {
    let store = PgInsightsStore::new(pool.clone());
    store
        .put("https://a.example", &record("https://a.example", 12))
        .await
        .unwrap();
    let hidden = store
        .put("https://b.example", &record("https://b.example", 3))
        .await
        .unwrap();
    sqlx::query("UPDATE store_insights SET is_active = false WHERE id = $1")
        .bind(hidden.id)
        .execute(&pool)
        .await
        .unwrap();

    let rows = list_recent_store_insights(&pool, 50).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].store_url, "https://a.example");
    assert_eq!(rows[0].total_product_count, 12);
    assert!(get_store_insights_by_id(&pool, hidden.id)
        .await
        .unwrap()
        .is_none());

    let by_address = store.get("https://b.example").await.unwrap().unwrap();
    assert_eq!(by_address.id, hidden.id);
    assert!(!by_address.active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stored_payload_round_trips_exactly(pool: sqlx::PgPool) {
    let store = PgInsightsStore::new(pool);
    let mut original = record("https://a.example", 2);
    original.privacy_policy_text = Some("We never sell data. «Ünïcode» kept.".to_string());

    let stored = store.put("https://a.example", &original).await.unwrap();
    let loaded = store.get("https://a.example").await.unwrap().unwrap();

    assert_eq!(loaded.payload, stored.payload);
    assert_eq!(loaded.record().unwrap(), original);
}

#[sqlx::test(migrations = "../../migrations")]
async fn gate_serves_fresh_row_from_postgres(pool: sqlx::PgPool) {
    let gate = FreshnessGate::new(
        PgInsightsStore::new(pool),
        Duration::from_secs(24 * 60 * 60),
    );

    let first = gate
        .lookup_or_refresh("https://a.example", || async {
            Ok::<_, String>(record("https://a.example", 2))
        })
        .await
        .unwrap();
    let second = gate
        .lookup_or_refresh("https://a.example", || async {
            Err::<AggregateRecord, _>("must not refresh".to_string())
        })
        .await
        .unwrap();

    assert_eq!(first.outcome, LookupOutcome::Inserted);
    assert_eq!(second.outcome, LookupOutcome::Hit);
    assert_eq!(second.stored.updated_at, first.stored.updated_at);
    assert_eq!(second.stored.payload, first.stored.payload);
}
