use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sqlx::sqlite::SqlitePool;

use super::{optional, required, sets::check_scope};
use crate::db;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{AthleteQuery, ExerciseNote, SaveNoteRequest};

// GET /api/workouts/:id/exercises/:exerciseId/notes?athleteId= - Note or null
pub async fn get_note(
    State(pool): State<SqlitePool>,
    Path((workout_id, block_exercise_id)): Path<(String, String)>,
    Query(params): Query<AthleteQuery>,
) -> Result<Json<Option<ExerciseNote>>, ApiError> {
    let athlete_id = required(params.athlete_id, "athleteId")?;
    check_scope(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;

    let note = db::get_note(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;
    Ok(Json(note))
}

// POST /api/workouts/:id/exercises/:exerciseId/notes - Upsert; a blank note deletes it
pub async fn save_note(
    State(pool): State<SqlitePool>,
    Path((workout_id, block_exercise_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<SaveNoteRequest>,
) -> Result<Response, ApiError> {
    let athlete_id = required(body.athlete_id, "athleteId")?;
    check_scope(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;

    match optional(body.note) {
        Some(note) => {
            let saved = db::upsert_note(&pool, &workout_id, &block_exercise_id, &athlete_id, &note).await?;
            Ok(Json(saved).into_response())
        }
        None => {
            db::delete_note(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}
