use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::debounce::{self, TimerHandle};
use crate::search::MovieSearch;

/// Debounces raw search input and commits the last value of each burst.
pub struct QueryDispatcher {
    search: Arc<MovieSearch>,
    quiet_period: Duration,
    pending: Mutex<Option<TimerHandle>>,
    last_committed: Arc<Mutex<Option<String>>>,
}

impl QueryDispatcher {
    pub fn new(search: Arc<MovieSearch>, quiet_period: Duration) -> Self {
        Self {
            search,
            quiet_period,
            pending: Mutex::new(None),
            last_committed: Arc::new(Mutex::new(None)),
        }
    }

    /// Registers a change of the search box. Must be called within a Tokio runtime.
    ///
    /// Each call restarts the quiet period; once it elapses the trimmed value is
    /// committed as a search, or as a discover call when blank. A value equal to
    /// the previous commit is dropped.
    pub fn input(&self, raw: &str) {
        let term = raw.trim().to_string();
        let search = Arc::clone(&self.search);
        let last_committed = Arc::clone(&self.last_committed);
        let commit = move || run_commit(search, last_committed, term);

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.as_mut() {
            Some(handle) => handle.reset(commit),
            None => *pending = Some(debounce::schedule(self.quiet_period, commit)),
        }
    }

    /// Records `term` as committed without going through the quiet period.
    pub fn mark_committed(&self, term: &str) {
        replace_committed(&self.last_committed, term.trim());
    }

    /// Whether an input is still waiting for its quiet period to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(TimerHandle::is_pending)
    }
}

/// Stores `term` as the last commit; false when it already was.
fn replace_committed(last_committed: &Mutex<Option<String>>, term: &str) -> bool {
    let mut last = last_committed.lock().unwrap_or_else(PoisonError::into_inner);
    if last.as_deref() == Some(term) {
        return false;
    }
    *last = Some(term.to_string());
    true
}

async fn run_commit(
    search: Arc<MovieSearch>,
    last_committed: Arc<Mutex<Option<String>>>,
    term: String,
) {
    if !replace_committed(&last_committed, &term) {
        debug!(%term, "search input unchanged since last commit");
        return;
    }

    debug!(%term, "committing search input");
    if let Err(err) = search.fetch_movies(&term).await {
        debug!(%term, error = %err, "committed search failed");
    }
}
