use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::aggregator::SearchCountAggregator;
use crate::catalog::{FetchError, MovieCatalog, MovieSummary};
use crate::filter::filter_movies;
use crate::view::ViewSender;

/// Result of a committed search that reached the catalog successfully.
#[derive(Debug)]
pub struct SearchOutcome {
    pub movies: Vec<MovieSummary>,
    /// Detached metric update, present for keyed searches with at least one result.
    pub aggregation: Option<JoinHandle<()>>,
}

/// Fetches, filters and publishes the movie list for a committed term.
pub struct MovieSearch {
    catalog: Arc<dyn MovieCatalog>,
    aggregator: Arc<SearchCountAggregator>,
    view: ViewSender,
}

impl MovieSearch {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        aggregator: Arc<SearchCountAggregator>,
        view: ViewSender,
    ) -> Self {
        Self {
            catalog,
            aggregator,
            view,
        }
    }

    /// Searches for `term`, or discovers popular movies when it is blank.
    ///
    /// The view is updated before any metric work starts; a failure clears the list and
    /// sets the error message.
    #[instrument(skip_all, fields(term = %term.trim()))]
    pub async fn fetch_movies(&self, term: &str) -> Result<SearchOutcome, FetchError> {
        let term = term.trim();
        self.view.send_modify(|state| {
            state.is_loading = true;
            state.error_message.clear();
        });

        let response = if term.is_empty() {
            self.catalog.discover_popular().await
        } else {
            self.catalog.search(term).await
        };

        let movies = match response {
            Ok(movies) => filter_movies(movies),
            Err(err) => {
                warn!(error = %err, "failed to fetch movies");
                let message = err.user_message();
                self.view.send_modify(|state| {
                    state.is_loading = false;
                    state.error_message = message;
                    state.movie_list.clear();
                });
                return Err(err);
            }
        };

        info!(count = movies.len(), "fetched movies");
        self.view.send_modify(|state| {
            state.is_loading = false;
            state.movie_list = movies.clone();
        });

        let aggregation = match movies.first() {
            Some(top) if !term.is_empty() => Some(
                self.aggregator
                    .spawn_record(term.to_string(), top.clone()),
            ),
            _ => None,
        };

        Ok(SearchOutcome {
            movies,
            aggregation,
        })
    }
}
