use crate::view::ViewState;

use super::types::ViewResponse;

pub fn render_view(state: &ViewState) -> ViewResponse {
    let error_message = if state.error_message.is_empty() {
        None
    } else {
        Some(state.error_message.clone())
    };

    ViewResponse {
        is_loading: state.is_loading,
        error_message,
        movie_list: state.movie_list.clone(),
        trending_movies: state.trending_panel().cloned().collect(),
    }
}
