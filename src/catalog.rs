use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::filter::EXCLUDED_GENRES;

/// Movie as returned by the catalog, trimmed to what the UI and metrics need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<u32>,
    pub adult: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("catalog reported no results: {message}")]
    EmptyResult { message: String },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Network failures and non-success statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Network { .. } | FetchError::Status { .. })
    }

    /// Message shown in the view when the primary search fails.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::EmptyResult { message } if !message.is_empty() => message.clone(),
            FetchError::EmptyResult { .. } => "failed to fetch movies".to_string(),
            _ => "Error fetching the movies please try again.".to_string(),
        }
    }
}

/// Read-only movie catalog.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, FetchError>;

    /// First page of movies ordered by popularity.
    async fn discover_popular(&self) -> Result<Vec<MovieSummary>, FetchError>;

    async fn get_by_id(&self, id: u64) -> Result<MovieSummary, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ResultsPage {
    #[serde(default)]
    results: Vec<MovieRecord>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieRecord {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    original_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    id: u32,
}

impl From<MovieRecord> for MovieSummary {
    fn from(record: MovieRecord) -> Self {
        // List endpoints carry `genre_ids`, the detail endpoint carries `genres`.
        let genre_ids = if record.genre_ids.is_empty() {
            record.genres.into_iter().map(|genre| genre.id).collect()
        } else {
            record.genre_ids
        };
        Self {
            id: record.id,
            title: record.title,
            poster_path: record.poster_path.filter(|path| !path.is_empty()),
            vote_average: record.vote_average,
            genre_ids,
            adult: record.adult,
            release_date: record.release_date.filter(|date| !date.is_empty()),
            original_language: record.original_language,
        }
    }
}

/// HTTP client for the TMDB v3 API.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(http: reqwest::Client, config: &CatalogConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "requesting catalog");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        resp.json::<T>()
            .await
            .map_err(|source| FetchError::Decode { url, source })
    }

    async fn get_page(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<MovieSummary>, FetchError> {
        let page: ResultsPage = self.get_json(path, query).await?;
        if page.success == Some(false) {
            return Err(FetchError::EmptyResult {
                message: page.status_message.unwrap_or_default(),
            });
        }
        Ok(page.results.into_iter().map(MovieSummary::from).collect())
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, FetchError> {
        self.get_page(
            "/search/movie",
            &[("query", term), ("include_adult", "false")],
        )
        .await
    }

    async fn discover_popular(&self) -> Result<Vec<MovieSummary>, FetchError> {
        // Pre-excludes on the server; the client-side filter still applies.
        let without_genres = EXCLUDED_GENRES
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("|");
        self.get_page(
            "/discover/movie",
            &[
                ("include_adult", "false"),
                ("include_video", "false"),
                ("language", "en-US"),
                ("page", "1"),
                ("sort_by", "popularity.desc"),
                ("without_genres", without_genres.as_str()),
            ],
        )
        .await
    }

    async fn get_by_id(&self, id: u64) -> Result<MovieSummary, FetchError> {
        let record: MovieRecord = self.get_json(&format!("/movie/{id}"), &[]).await?;
        Ok(record.into())
    }
}
