use std::sync::Arc;

use liftboard::config::{Config, VideoStoreConfig};
use liftboard::storage::{HttpVideoStore, LocalVideoStore, VideoStore};
use liftboard::{build_router, db, AppState};
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting liftboard server...");

    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("Invalid configuration");

    // Create database connection pool
    let pool = db::connect(&config.database_url, config.db_access)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Database connection established ({:?} access).", config.db_access);

    let videos: Arc<dyn VideoStore> = match &config.video_store {
        VideoStoreConfig::Local { dir, public_url } => {
            tracing::info!("Storing videos in {} served at {}", dir.display(), public_url);
            Arc::new(LocalVideoStore::new(dir.clone(), public_url.clone()))
        }
        VideoStoreConfig::Remote { base_url, api_key, bucket } => {
            tracing::info!("Storing videos in bucket {} at {}", bucket, base_url);
            Arc::new(HttpVideoStore::new(base_url.clone(), api_key.clone(), bucket.clone()))
        }
    };

    let state = AppState {
        pool,
        videos,
        max_video_bytes: config.max_video_bytes,
    };

    let mut app = build_router(state);

    if let VideoStoreConfig::Local { dir, public_url } = &config.video_store {
        if public_url.starts_with('/') && public_url.len() > 1 {
            app = app.nest_service(public_url.trim_end_matches('/'), ServeDir::new(dir));
        }
    }

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server.");
}
