//! Configuration module for the Cinema backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign and verify JWT session tokens
    pub jwt_secret: String,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// TMDB API key (movie metadata proxy is unusable without it)
    pub tmdb_api_key: Option<String>,
    /// Base URL of the TMDB API (overridable for tests)
    pub tmdb_base_url: String,
    /// Language passed through to TMDB queries
    pub tmdb_language: String,
}

/// Fallback signing secret matching the original deployment default.
pub const DEFAULT_JWT_SECRET: &str = "default_secret";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret =
            env::var("CINEMA_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        let db_path = env::var("CINEMA_DB_PATH")
            .unwrap_or_else(|_| "./data/cinema.sqlite".to_string())
            .into();

        let bind_addr = env::var("CINEMA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
            .parse()
            .expect("Invalid CINEMA_BIND_ADDR format");

        let log_level = env::var("CINEMA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let tmdb_api_key = env::var("TMDB_API_KEY").ok();

        let tmdb_base_url = env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let tmdb_language = env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "ko-KR".to_string());

        Self {
            jwt_secret,
            db_path,
            bind_addr,
            log_level,
            tmdb_api_key,
            tmdb_base_url,
            tmdb_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("CINEMA_JWT_SECRET");
        env::remove_var("CINEMA_DB_PATH");
        env::remove_var("CINEMA_BIND_ADDR");
        env::remove_var("CINEMA_LOG_LEVEL");
        env::remove_var("TMDB_API_KEY");
        env::remove_var("TMDB_BASE_URL");
        env::remove_var("TMDB_LANGUAGE");

        let config = Config::from_env();

        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.db_path, PathBuf::from("./data/cinema.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3001");
        assert_eq!(config.log_level, "info");
        assert!(config.tmdb_api_key.is_none());
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb_language, "ko-KR");
    }
}
