use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::catalog::MovieSummary;
use crate::trending::TrendingEntry;

#[derive(Debug, Deserialize)]
pub struct MovieSearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieListResponse {
    pub results: Vec<MovieSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub results: Vec<TrendingEntry>,
}

/// Snapshot of the view as the rendering surface sees it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewResponse {
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub movie_list: Vec<MovieSummary>,
    pub trending_movies: Vec<TrendingEntry>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<anyhow::Error>,
}

impl ApiError {
    /// Upstream service failed; `message` is safe to show to users.
    pub fn bad_gateway(message: impl Into<String>, detail: anyhow::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
            detail: Some(detail),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let Some(detail) = &self.detail {
            tracing::error!(error = %detail);
        }
        let body = Json(ErrorBody {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
