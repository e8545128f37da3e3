//! Movie API endpoints proxying the metadata provider.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Movie, MoviePage};
use crate::AppState;

fn default_page() -> u32 {
    1
}

/// Pagination query for the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
}

/// Query for the title search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

/// GET /api/movies/popular - Popular movies, paged.
pub async fn popular_movies(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<MoviePage> {
    success(state.tmdb.popular(params.page).await?)
}

/// GET /api/movies/top-rated - Top-rated movies, paged.
pub async fn top_rated_movies(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<MoviePage> {
    success(state.tmdb.top_rated(params.page).await?)
}

/// GET /api/movies/search - Title search, paged.
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<MoviePage> {
    if params.query.trim().is_empty() {
        return Err(AppError::Validation(
            "Search query is required".to_string(),
        ));
    }

    success(state.tmdb.search(&params.query, params.page).await?)
}

/// GET /api/movies/:movie_id - Full movie detail with videos appended.
pub async fn movie_details(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> ApiResult<Movie> {
    success(state.tmdb.details(movie_id).await?)
}
