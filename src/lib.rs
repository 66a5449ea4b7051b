//! Liftboard: HTTP backend for a workout tracker.
//!
//! Athletes, teams, an exercise library, workouts made of ordered blocks of
//! exercises, per-athlete set logging and notes, and exercise video uploads,
//! all over a SQLite database.

pub mod auth;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod import;
pub mod models;
pub mod routes;
pub mod storage;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post},
    Router,
};
use sqlx::sqlite::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::storage::VideoStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub videos: Arc<dyn VideoStore>,
    pub max_video_bytes: usize,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Permissive CORS; also answers pre-flight requests.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    let video_limit = DefaultBodyLimit::max(state.max_video_bytes);

    let api = Router::new()
        // Athletes and auth
        .route("/athletes", get(routes::athletes::get_athletes).post(routes::athletes::create_athlete))
        .route(
            "/athletes/{id}",
            get(routes::athletes::get_athlete_by_id)
                .put(routes::athletes::update_athlete)
                .delete(routes::athletes::delete_athlete),
        )
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/validate/{token}", get(routes::auth::validate_token))

        // Exercise library
        .route("/exercises", get(routes::exercises::get_exercises).post(routes::exercises::create_exercise))
        .route(
            "/exercises/{id}",
            get(routes::exercises::get_exercise_by_id)
                .put(routes::exercises::update_exercise)
                .delete(routes::exercises::delete_exercise),
        )

        // Teams
        .route("/teams", get(routes::teams::get_teams).post(routes::teams::create_team))
        .route(
            "/teams/{id}",
            get(routes::teams::get_team_by_id)
                .put(routes::teams::update_team)
                .delete(routes::teams::delete_team),
        )
        .route("/teams/{id}/athletes", post(routes::teams::add_team_athlete))
        .route("/teams/{id}/athletes/{athlete_id}", delete(routes::teams::remove_team_athlete))

        // Workouts
        .route("/workouts", get(routes::workouts::get_workouts).post(routes::workouts::create_workout))
        .route(
            "/workouts/{id}",
            get(routes::workouts::get_workout_by_id)
                .put(routes::workouts::update_workout)
                .delete(routes::workouts::delete_workout),
        )
        .route("/workouts/{id}/completion", get(routes::workouts::get_workout_completion))
        .route(
            "/workouts/{id}/exercises/{exercise_id}/sets",
            get(routes::sets::get_sets).post(routes::sets::save_sets),
        )
        .route(
            "/workouts/{id}/exercises/{exercise_id}/notes",
            get(routes::notes::get_note).post(routes::notes::save_note),
        )

        // Uploads
        .route("/upload/video", post(routes::upload::upload_video).layer(video_limit));

    Router::new()
        .route("/", get(|| async { "Liftboard API - v1.0" }))
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
