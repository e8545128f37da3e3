//! Cinema 21 Backend server binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinema_backend::config::{Config, DEFAULT_JWT_SECRET};
use cinema_backend::db::{self, Repository};
use cinema_backend::tmdb::TmdbClient;
use cinema_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cinema 21 Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("CINEMA_JWT_SECRET is not set; using the insecure default secret");
    }
    if config.tmdb_api_key.is_none() {
        tracing::warn!(
            "No TMDB API key configured (TMDB_API_KEY). Movie metadata requests will fail!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Metadata provider client
    let tmdb = Arc::new(TmdbClient::new(
        config.tmdb_base_url.clone(),
        config.tmdb_api_key.clone().unwrap_or_default(),
        config.tmdb_language.clone(),
    ));

    // Create application state
    let state = AppState {
        repo,
        tmdb,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
