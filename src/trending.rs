use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::MovieCatalog;
use crate::filter::has_excluded_genre;
use crate::metrics::{MetricDocument, MetricStore};
use crate::view::ViewSender;

/// Documents read from the store before filtering.
pub const TRENDING_CANDIDATES: usize = 20;
/// Entries kept after filtering.
pub const TRENDING_LIMIT: usize = 5;

/// Metric document enriched with live catalog data. Never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    #[serde(flatten)]
    pub metric: MetricDocument,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<u32>,
}

pub struct TrendingResolver {
    catalog: Arc<dyn MovieCatalog>,
    store: Arc<dyn MetricStore>,
}

impl TrendingResolver {
    pub fn new(catalog: Arc<dyn MovieCatalog>, store: Arc<dyn MetricStore>) -> Self {
        Self { catalog, store }
    }

    /// Most searched terms, most popular first, with current catalog details.
    ///
    /// Store failures yield an empty list. Entries whose detail fetch fails are dropped.
    #[instrument(skip_all)]
    pub async fn resolve(&self) -> Vec<TrendingEntry> {
        let documents = match self.store.top_by_count(TRENDING_CANDIDATES).await {
            Ok(documents) => documents,
            Err(err) => {
                warn!(error = %err, "failed to read trending metrics");
                return Vec::new();
            }
        };

        let candidates: Vec<MetricDocument> = documents
            .into_iter()
            .filter(|doc| {
                let excluded = has_excluded_genre(&doc.category);
                if excluded {
                    debug!(term = %doc.search_term, category = ?doc.category, "excluded by genre");
                }
                !excluded
            })
            .take(TRENDING_LIMIT)
            .collect();

        let enriched = join_all(candidates.into_iter().map(|doc| self.enrich(doc))).await;
        let entries: Vec<TrendingEntry> = enriched.into_iter().flatten().collect();
        info!(count = entries.len(), "resolved trending movies");
        entries
    }

    /// Resolves trending movies and publishes them to the view.
    pub async fn load_into(&self, view: &ViewSender) -> Vec<TrendingEntry> {
        let entries = self.resolve().await;
        view.send_modify(|state| state.trending_movies = entries.clone());
        entries
    }

    async fn enrich(&self, metric: MetricDocument) -> Option<TrendingEntry> {
        match self.catalog.get_by_id(metric.movie_id).await {
            Ok(details) => Some(TrendingEntry {
                title: details.title,
                poster_path: details.poster_path,
                vote_average: details.vote_average,
                genre_ids: details.genre_ids,
                metric,
            }),
            Err(err) => {
                warn!(movie_id = metric.movie_id, error = %err, "dropping trending entry");
                None
            }
        }
    }
}
