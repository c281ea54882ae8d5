use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::app::MoviePulse;

use super::handlers::{get_trending, get_view, healthz, search_movies, submit_input};

#[derive(Clone)]
pub struct AppState {
    pub(crate) app: Arc<MoviePulse>,
}

impl AppState {
    pub fn new(app: Arc<MoviePulse>) -> Self {
        Self { app }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/movies", get(search_movies))
        .route("/input", post(submit_input))
        .route("/trending", get(get_trending))
        .route("/view", get(get_view))
        .with_state(state)
}
