use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::sqlite::SqlitePool;

use super::{optional, required};
use crate::db;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{Exercise, ExerciseInput, NewExercise};

// Query parameters for listing exercises
#[derive(Deserialize)]
pub struct ListExercisesQuery {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

// GET /api/exercises - Exercise library in id order
pub async fn get_exercises(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListExercisesQuery>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let category = optional(params.category);
    let search = optional(params.search);
    let exercises = db::get_all_exercises(&pool, category.as_deref(), search.as_deref()).await?;
    Ok(Json(exercises))
}

// POST /api/exercises - Add to the library with the next sequential id
pub async fn create_exercise(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<ExerciseInput>,
) -> Result<(StatusCode, Json<Exercise>), ApiError> {
    let exercise = NewExercise {
        name: required(body.name, "name")?,
        video_url: optional(body.video_url),
        category: optional(body.category),
        instructions: optional(body.instructions),
    };

    let created = db::insert_exercise(&pool, &exercise).await?;
    tracing::info!("Created exercise {} ({})", created.id, created.name);

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/exercises/:id
pub async fn get_exercise_by_id(
    State(pool): State<SqlitePool>,
    Path(exercise_id): Path<String>,
) -> Result<Json<Exercise>, ApiError> {
    let exercise = db::get_exercise_by_id(&pool, &exercise_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Exercise not found"))?;

    Ok(Json(exercise))
}

// PUT /api/exercises/:id
pub async fn update_exercise(
    State(pool): State<SqlitePool>,
    Path(exercise_id): Path<String>,
    ApiJson(body): ApiJson<ExerciseInput>,
) -> Result<Json<Exercise>, ApiError> {
    let name = optional(body.name);
    let video_url = optional(body.video_url);
    let category = optional(body.category);
    let instructions = optional(body.instructions);

    let exercise = db::update_exercise(
        &pool,
        &exercise_id,
        name.as_deref(),
        video_url.as_deref(),
        category.as_deref(),
        instructions.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Exercise not found"))?;

    Ok(Json(exercise))
}

// DELETE /api/exercises/:id - Remove and re-pack the remaining ids
pub async fn delete_exercise(
    State(pool): State<SqlitePool>,
    Path(exercise_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !db::delete_exercise(&pool, &exercise_id).await? {
        return Err(ApiError::not_found("Exercise not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
