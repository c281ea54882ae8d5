use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::catalog::MovieSummary;
use crate::filter::has_excluded_genre;
use crate::trending::TrendingEntry;

/// State consumed by the rendering surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub is_loading: bool,
    pub error_message: String,
    pub movie_list: Vec<MovieSummary>,
    pub trending_movies: Vec<TrendingEntry>,
}

impl ViewState {
    /// Trending entries as rendered: excluded categories are skipped once more.
    pub fn trending_panel(&self) -> impl Iterator<Item = &TrendingEntry> {
        self.trending_movies.iter().filter(|entry| is_rendered(entry))
    }
}

fn is_rendered(entry: &TrendingEntry) -> bool {
    !has_excluded_genre(&entry.metric.category)
}

/// Publishing side of the view, shared by every component that updates it.
pub type ViewSender = Arc<watch::Sender<ViewState>>;
pub type ViewReceiver = watch::Receiver<ViewState>;

pub fn channel() -> ViewSender {
    let (sender, _receiver) = watch::channel(ViewState::default());
    Arc::new(sender)
}
