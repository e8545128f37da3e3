//! Cinema 21 Backend
//!
//! REST backend for a movie-browsing and review application: user accounts,
//! review CRUD over SQLite, a TMDB metadata proxy, and the review
//! aggregation engine shared with the UI shell.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod models;
pub mod tmdb;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use tmdb::TmdbClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub tmdb: Arc<TmdbClient>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Users
        .route("/users/signup", post(api::signup))
        .route("/users/login", post(api::login))
        .route("/users/me", get(api::current_user))
        .route("/users/me/reviews", get(api::list_my_reviews))
        // Reviews
        .route("/reviews", post(api::create_review))
        .route(
            "/reviews/{id}",
            get(api::list_movie_reviews).delete(api::delete_review),
        )
        // Movies (metadata proxy)
        .route("/movies/popular", get(api::popular_movies))
        .route("/movies/top-rated", get(api::top_rated_movies))
        .route("/movies/search", get(api::search_movies))
        .route("/movies/{movie_id}", get(api::movie_details));

    Router::new()
        .nest("/api", api_routes)
        .route("/", get(api_index))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root route describing the API surface.
async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Cinema 21 API Server",
        "version": "1.0.0",
        "endpoints": {
            "users": "/api/users",
            "reviews": "/api/reviews",
            "movies": "/api/movies"
        }
    }))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
