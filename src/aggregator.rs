use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::catalog::{FetchError, MovieCatalog, MovieSummary};
use crate::metrics::{MetricDocument, MetricPatch, MetricStore, NewMetric, StoreError};

const POSTER_CDN: &str = "https://image.tmdb.org/t/p";
const POSTER_SIZE: &str = "w500";

#[derive(Debug, Error)]
pub enum AggregationFailure {
    #[error("looking up metric for {term:?}: {source}")]
    Lookup {
        term: String,
        #[source]
        source: StoreError,
    },
    #[error("fetching details for movie {movie_id}: {source}")]
    Details {
        movie_id: u64,
        #[source]
        source: FetchError,
    },
    #[error("writing metric for {term:?}: {source}")]
    Write {
        term: String,
        #[source]
        source: StoreError,
    },
    #[error("nothing to record: empty search term")]
    EmptyTerm,
}

/// Builds the CDN URL for a TMDB poster path.
pub fn poster_url(poster_path: &str) -> String {
    format!(
        "{}/{}/{}",
        POSTER_CDN,
        POSTER_SIZE,
        poster_path.trim_start_matches('/')
    )
}

/// Counts successful searches per term in the metric store.
pub struct SearchCountAggregator {
    catalog: Arc<dyn MovieCatalog>,
    store: Arc<dyn MetricStore>,
}

impl SearchCountAggregator {
    pub fn new(catalog: Arc<dyn MovieCatalog>, store: Arc<dyn MetricStore>) -> Self {
        Self { catalog, store }
    }

    /// Records one search of `term` whose top result was `top`.
    ///
    /// The existing document (if any) gets `count + 1` and fresh genre tags; otherwise a
    /// document with `count = 1` is created. Nothing is written when the detail fetch fails.
    #[instrument(skip_all, fields(term = %term.trim(), movie_id = top.id))]
    pub async fn record(
        &self,
        term: &str,
        top: &MovieSummary,
    ) -> Result<MetricDocument, AggregationFailure> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AggregationFailure::EmptyTerm);
        }

        let existing = self.store.find_by_term(term).await.map_err(|source| {
            AggregationFailure::Lookup {
                term: term.to_string(),
                source,
            }
        })?;

        let details = self.catalog.get_by_id(top.id).await.map_err(|source| {
            AggregationFailure::Details {
                movie_id: top.id,
                source,
            }
        })?;
        let category = details.genre_ids.clone();

        let written = match existing {
            Some(doc) => {
                let patch = MetricPatch {
                    count: doc.count + 1,
                    category,
                };
                self.store.update(&doc.id, patch).await
            }
            None => {
                let average_rating = if top.vote_average > 0.0 {
                    top.vote_average
                } else {
                    details.vote_average
                };
                let poster_path = top.poster_path.as_deref().or(details.poster_path.as_deref());
                let metric = NewMetric {
                    search_term: term.to_string(),
                    count: 1,
                    movie_id: top.id,
                    average_rating,
                    poster_url: poster_path.map(poster_url),
                    category,
                };
                self.store.create(metric).await
            }
        };

        let doc = written.map_err(|source| AggregationFailure::Write {
            term: term.to_string(),
            source,
        })?;
        info!(id = %doc.id, count = doc.count, category = ?doc.category, "recorded search metric");
        Ok(doc)
    }

    /// Spawns [`record`](Self::record) as a detached task; failures are only logged.
    pub fn spawn_record(self: &Arc<Self>, term: String, top: MovieSummary) -> JoinHandle<()> {
        let aggregator = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = aggregator.record(&term, &top).await {
                warn!(error = %err, "search metric not recorded");
            }
        })
    }
}
