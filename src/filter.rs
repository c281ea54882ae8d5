//! Content filter shared by search results, the aggregator and the trending panel.

use crate::catalog::MovieSummary;

/// TMDB genre tags that are never shown: Drama and Romance.
pub const EXCLUDED_GENRES: [u32; 2] = [18, 10749];

pub fn has_excluded_genre(genre_ids: &[u32]) -> bool {
    genre_ids.iter().any(|id| EXCLUDED_GENRES.contains(id))
}

pub fn is_displayable(movie: &MovieSummary) -> bool {
    !movie.adult && !has_excluded_genre(&movie.genre_ids)
}

/// Drops adult movies and movies tagged with an excluded genre, keeping order.
pub fn filter_movies(movies: Vec<MovieSummary>) -> Vec<MovieSummary> {
    movies.into_iter().filter(is_displayable).collect()
}
