use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use sqlx::sqlite::SqlitePool;

use super::required;
use crate::completion::spawn_refresh;
use crate::db;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{AthleteQuery, ExerciseSet, SaveSetsRequest};

/// The block exercise must belong to the workout, and the athlete must exist.
pub(crate) async fn check_scope(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
    athlete_id: &str,
) -> Result<(), ApiError> {
    if db::get_block_exercise_in_workout(pool, workout_id, block_exercise_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Exercise not found in this workout"));
    }
    if !db::athlete_exists(pool, athlete_id).await? {
        return Err(ApiError::not_found("Athlete not found"));
    }
    Ok(())
}

// GET /api/workouts/:id/exercises/:exerciseId/sets?athleteId=
pub async fn get_sets(
    State(pool): State<SqlitePool>,
    Path((workout_id, block_exercise_id)): Path<(String, String)>,
    Query(params): Query<AthleteQuery>,
) -> Result<Json<Vec<ExerciseSet>>, ApiError> {
    let athlete_id = required(params.athlete_id, "athleteId")?;
    check_scope(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;

    let sets = db::get_sets(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;
    Ok(Json(sets))
}

// POST /api/workouts/:id/exercises/:exerciseId/sets - Save the athlete's sets for one exercise
pub async fn save_sets(
    State(pool): State<SqlitePool>,
    Path((workout_id, block_exercise_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<SaveSetsRequest>,
) -> Result<Json<Vec<ExerciseSet>>, ApiError> {
    let athlete_id = required(body.athlete_id, "athleteId")?;

    let mut numbers = HashSet::new();
    for set in &body.sets {
        if set.set_number < 1 {
            return Err(ApiError::bad_request("setNumber must be 1 or greater"));
        }
        if !numbers.insert(set.set_number) {
            return Err(ApiError::bad_request(format!("set {} listed twice", set.set_number)));
        }
    }

    check_scope(&pool, &workout_id, &block_exercise_id, &athlete_id).await?;

    let saved = db::save_sets(&pool, &workout_id, &block_exercise_id, &athlete_id, &body.sets).await?;

    // Completion is recomputed in the background; the save does not wait for it.
    spawn_refresh(pool.clone(), workout_id, athlete_id);

    Ok(Json(saved))
}
