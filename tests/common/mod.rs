#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use movie_pulse::app::MoviePulse;
use movie_pulse::catalog::{FetchError, MovieCatalog, MovieSummary};
use movie_pulse::metrics::{
    MemoryMetricStore, MetricDocument, MetricPatch, MetricStore, NewMetric, StoreError,
};
use reqwest::StatusCode;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

pub fn movie(id: u64, title: &str, genre_ids: &[u32]) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        vote_average: 7.5,
        genre_ids: genre_ids.to_vec(),
        adult: false,
        release_date: Some("1999-03-31".to_string()),
        original_language: Some("en".to_string()),
    }
}

pub fn metric(id: &str, term: &str, count: u64, movie_id: u64, category: &[u32]) -> MetricDocument {
    MetricDocument {
        id: id.to_string(),
        search_term: term.to_string(),
        count,
        movie_id,
        average_rating: Some(7.0),
        poster_url: None,
        category: category.to_vec(),
        updated_at: None,
    }
}

/// In-process catalog with canned responses and a call log.
#[derive(Default)]
pub struct FakeCatalog {
    search_results: Mutex<HashMap<String, Vec<MovieSummary>>>,
    discover_results: Mutex<Vec<MovieSummary>>,
    details: Mutex<HashMap<u64, MovieSummary>>,
    search_error: Mutex<Option<StatusCode>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_search(&self, term: &str, movies: Vec<MovieSummary>) {
        for movie in &movies {
            self.details
                .lock()
                .unwrap()
                .entry(movie.id)
                .or_insert_with(|| movie.clone());
        }
        self.search_results
            .lock()
            .unwrap()
            .insert(term.to_string(), movies);
    }

    pub fn with_discover(&self, movies: Vec<MovieSummary>) {
        *self.discover_results.lock().unwrap() = movies;
    }

    pub fn with_details(&self, movie: MovieSummary) {
        self.details.lock().unwrap().insert(movie.id, movie);
    }

    pub fn without_details(&self, id: u64) {
        self.details.lock().unwrap().remove(&id);
    }

    pub fn fail_search(&self, status: StatusCode) {
        *self.search_error.lock().unwrap() = Some(status);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn search(&self, term: &str) -> Result<Vec<MovieSummary>, FetchError> {
        self.record(format!("search:{term}"));
        if let Some(status) = *self.search_error.lock().unwrap() {
            return Err(FetchError::Status {
                url: "http://catalog.test/search/movie".to_string(),
                status,
            });
        }
        Ok(self
            .search_results
            .lock()
            .unwrap()
            .get(term)
            .cloned()
            .unwrap_or_default())
    }

    async fn discover_popular(&self) -> Result<Vec<MovieSummary>, FetchError> {
        self.record("discover".to_string());
        Ok(self.discover_results.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: u64) -> Result<MovieSummary, FetchError> {
        self.record(format!("details:{id}"));
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("http://catalog.test/movie/{id}"),
                status: StatusCode::NOT_FOUND,
            })
    }
}

/// Metric store whose every call fails.
pub struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError::Status {
        url: "http://store.test/documents".to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "maintenance".to_string(),
    }
}

#[async_trait]
impl MetricStore for UnavailableStore {
    async fn find_by_term(&self, _term: &str) -> Result<Option<MetricDocument>, StoreError> {
        Err(unavailable())
    }

    async fn top_by_count(&self, _limit: usize) -> Result<Vec<MetricDocument>, StoreError> {
        Err(unavailable())
    }

    async fn create(&self, _metric: NewMetric) -> Result<MetricDocument, StoreError> {
        Err(unavailable())
    }

    async fn update(&self, _id: &str, _patch: MetricPatch) -> Result<MetricDocument, StoreError> {
        Err(unavailable())
    }
}

pub fn build_app(catalog: Arc<FakeCatalog>, store: Arc<MemoryMetricStore>) -> MoviePulse {
    MoviePulse::new(catalog, store, Duration::from_millis(500))
}
