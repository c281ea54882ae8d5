use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_COLLECTION_ID: &str = "metrics";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Application configuration driven by environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub quiet_period: Duration,
    pub catalog: CatalogConfig,
    /// `None` when no Appwrite endpoint is configured; an in-memory store is used instead.
    pub metric_store: Option<MetricStoreConfig>,
}

/// Connection settings for the TMDB catalog API.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Connection settings for the Appwrite metrics collection.
#[derive(Debug, Clone)]
pub struct MetricStoreConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr: SocketAddr = var("MOVIE_PULSE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("parsing MOVIE_PULSE_BIND_ADDR")?;

        let debounce_ms = match var("MOVIE_PULSE_DEBOUNCE_MS") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing MOVIE_PULSE_DEBOUNCE_MS={value}"))?,
            None => DEFAULT_DEBOUNCE_MS,
        };

        let catalog = CatalogConfig {
            base_url: var("TMDB_API_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
            api_key: var("TMDB_API_KEY").context("TMDB_API_KEY must be set")?,
        };

        let metric_store = match var("APPWRITE_ENDPOINT") {
            Some(endpoint) => Some(MetricStoreConfig {
                endpoint,
                project_id: var("APPWRITE_PROJECT_ID")
                    .context("APPWRITE_PROJECT_ID must be set when APPWRITE_ENDPOINT is")?,
                database_id: var("APPWRITE_DATABASE_ID")
                    .context("APPWRITE_DATABASE_ID must be set when APPWRITE_ENDPOINT is")?,
                collection_id: var("APPWRITE_COLLECTION_ID")
                    .unwrap_or_else(|| DEFAULT_COLLECTION_ID.to_string()),
                api_key: var("APPWRITE_API_KEY"),
            }),
            None => None,
        };

        Ok(Self {
            bind_addr,
            quiet_period: Duration::from_millis(debounce_ms),
            catalog,
            metric_store,
        })
    }
}
