//! Read-only queries over stored analyses.

use storelens_db::{InsightsStore, PgInsightsStore};

/// Print the most recently analyzed stores as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stores(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let store = PgInsightsStore::new(pool.clone());
    let summaries = store.list_recent(limit.max(1)).await?;

    if summaries.is_empty() {
        println!("no stores analyzed yet; run `analyze` through the server first");
        return Ok(());
    }

    println!("{:<8}{:<45}{:<18}PRODUCTS", "ID", "STORE", "UPDATED");
    for summary in &summaries {
        let updated = summary.last_updated.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<8}{:<45}{:<18}{}",
            summary.id, summary.target_address, updated, summary.total_product_count
        );
    }

    Ok(())
}

/// Print one stored record as pretty JSON.
///
/// # Errors
///
/// Returns an error if the id is unknown, the query fails, or the stored
/// payload does not decode.
pub(crate) async fn run_show(pool: &sqlx::PgPool, id: i64) -> anyhow::Result<()> {
    let store = PgInsightsStore::new(pool.clone());
    let stored = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("store {id} not found"))?;

    let record = stored.record()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
