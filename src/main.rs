use std::sync::Arc;

use anyhow::Result;
use movie_pulse::api;
use movie_pulse::app::MoviePulse;
use movie_pulse::catalog::{MovieCatalog, TmdbClient};
use movie_pulse::config::AppConfig;
use movie_pulse::metrics::{AppwriteMetricStore, MemoryMetricStore, MetricStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .pretty()
        .init();

    let config = AppConfig::from_env()?;
    info!(
        catalog = %config.catalog.base_url,
        bind_addr = %config.bind_addr,
        quiet_period_ms = config.quiet_period.as_millis() as u64,
        "loaded configuration"
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::new(http.clone(), &config.catalog));
    let store: Arc<dyn MetricStore> = match config.metric_store.clone() {
        Some(store_config) => {
            info!(
                endpoint = %store_config.endpoint,
                collection = %store_config.collection_id,
                "using appwrite metric store"
            );
            Arc::new(AppwriteMetricStore::new(http, store_config))
        }
        None => {
            warn!("APPWRITE_ENDPOINT not set; search metrics are kept in memory");
            Arc::new(MemoryMetricStore::new())
        }
    };

    let app = Arc::new(MoviePulse::new(catalog, store, config.quiet_period));
    app.mount();

    let router = api::router(api::AppState::new(app));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "starting http server");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
