use axum::Json;
use axum::extract::{Query as AxumQuery, State};
use axum::http::StatusCode;
use tracing::{debug, instrument};

use super::state::AppState;
use super::types::{
    ApiError, InputRequest, MovieListResponse, MovieSearchParams, TrendingResponse, ViewResponse,
};
use super::utils::render_view;

pub async fn healthz() -> &'static str {
    "ok"
}

/// Runs a search immediately, bypassing the debounce.
#[instrument(skip_all)]
pub async fn search_movies(
    State(state): State<AppState>,
    AxumQuery(params): AxumQuery<MovieSearchParams>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let term = params.query.as_deref().unwrap_or("");
    let outcome = state
        .app
        .search
        .fetch_movies(term)
        .await
        .map_err(|err| ApiError::bad_gateway(err.user_message(), err.into()))?;

    Ok(Json(MovieListResponse {
        results: outcome.movies,
    }))
}

#[instrument(skip_all)]
pub async fn submit_input(
    State(state): State<AppState>,
    Json(request): Json<InputRequest>,
) -> StatusCode {
    debug!(value = %request.value, "search input changed");
    state.app.dispatcher.input(&request.value);
    StatusCode::ACCEPTED
}

#[instrument(skip_all)]
pub async fn get_trending(State(state): State<AppState>) -> Json<TrendingResponse> {
    state
        .app
        .trending
        .load_into(state.app.view_sender())
        .await;
    Json(TrendingResponse {
        results: render_view(&state.app.snapshot()).trending_movies,
    })
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    Json(render_view(&state.app.snapshot()))
}
