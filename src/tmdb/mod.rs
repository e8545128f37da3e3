//! TMDB client backing the movie metadata proxy.
//!
//! Every request carries the configured API key and language; non-success
//! upstream responses surface as retryable upstream errors, never panics.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::engine::MetadataProvider;
use crate::errors::AppError;
use crate::models::{Movie, MoviePage};

/// HTTP client for the TMDB API.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            language: language.into(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let mut query: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        query.extend_from_slice(params);

        let response = self.http.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Metadata provider returned {} for {}",
                response.status(),
                path
            )));
        }

        Ok(response.json::<T>().await?)
    }

    /// Popular movies, paged.
    pub async fn popular(&self, page: u32) -> Result<MoviePage, AppError> {
        self.get("/movie/popular", &[("page", page.to_string())])
            .await
    }

    /// Top-rated movies, paged.
    pub async fn top_rated(&self, page: u32) -> Result<MoviePage, AppError> {
        self.get("/movie/top_rated", &[("page", page.to_string())])
            .await
    }

    /// Title search, paged.
    pub async fn search(&self, query: &str, page: u32) -> Result<MoviePage, AppError> {
        self.get(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    /// Full detail record for one movie, with videos and credits appended.
    pub async fn details(&self, movie_id: i64) -> Result<Movie, AppError> {
        self.get(
            &format!("/movie/{}", movie_id),
            &[("append_to_response", "videos,credits".to_string())],
        )
        .await
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn movie_details(&self, movie_id: i64) -> Result<Movie, AppError> {
        self.details(movie_id).await
    }
}
