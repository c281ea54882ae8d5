use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::aggregator::SearchCountAggregator;
use crate::catalog::MovieCatalog;
use crate::dispatcher::QueryDispatcher;
use crate::metrics::MetricStore;
use crate::search::MovieSearch;
use crate::trending::TrendingResolver;
use crate::view::{self, ViewReceiver, ViewSender, ViewState};

/// Application root: owns the clients and every pipeline component built on them.
pub struct MoviePulse {
    pub search: Arc<MovieSearch>,
    pub trending: Arc<TrendingResolver>,
    pub dispatcher: QueryDispatcher,
    view: ViewSender,
}

impl MoviePulse {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        store: Arc<dyn MetricStore>,
        quiet_period: Duration,
    ) -> Self {
        let view = view::channel();
        let aggregator = Arc::new(SearchCountAggregator::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
        ));
        let search = Arc::new(MovieSearch::new(
            Arc::clone(&catalog),
            aggregator,
            Arc::clone(&view),
        ));
        let trending = Arc::new(TrendingResolver::new(catalog, store));
        let dispatcher = QueryDispatcher::new(Arc::clone(&search), quiet_period);

        Self {
            search,
            trending,
            dispatcher,
            view,
        }
    }

    pub fn view_sender(&self) -> &ViewSender {
        &self.view
    }

    pub fn snapshot(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> ViewReceiver {
        self.view.subscribe()
    }

    /// Initial load: trending panel plus the discover list for the empty term.
    pub fn mount(&self) -> JoinHandle<()> {
        self.dispatcher.mark_committed("");
        let search = Arc::clone(&self.search);
        let trending = Arc::clone(&self.trending);
        let view = Arc::clone(&self.view);
        tokio::spawn(async move {
            let (entries, movies) =
                tokio::join!(trending.load_into(&view), search.fetch_movies(""));
            let movie_count = movies.map(|outcome| outcome.movies.len()).unwrap_or(0);
            info!(
                trending = entries.len(),
                movies = movie_count,
                "initial load finished"
            );
        })
    }
}
