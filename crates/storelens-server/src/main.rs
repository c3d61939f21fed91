mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use storelens_db::{FreshnessGate, PgInsightsStore};
use storelens_enhance::BrandEnhancer;
use storelens_scraper::Coordinator;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storelens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting storelens server");

    let pool = storelens_db::connect_pool_from_config(&config).await?;
    let applied = storelens_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations complete");

    let max_age = Duration::from_secs(config.cache_max_age_hours.saturating_mul(60 * 60));
    let state = AppState {
        gate: Arc::new(FreshnessGate::new(
            PgInsightsStore::new(pool.clone()),
            max_age,
        )),
        coordinator: Arc::new(Coordinator::from_config(&config)?),
        enhancer: Arc::new(BrandEnhancer::from_config(&config)?),
        analysis_timeout: Duration::from_secs(config.analysis_timeout_secs),
        pool: Some(pool),
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
