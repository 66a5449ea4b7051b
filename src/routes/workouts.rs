use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::sqlite::SqlitePool;

use super::{optional, required};
use crate::completion::{compute_progress, WorkoutProgress};
use crate::db::{self, WorkoutFilter};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{
    AthleteQuery, NewBlock, NewBlockExercise, NewWorkout, Workout, WorkoutInput, WorkoutSummary,
};

/// Query parameters for listing workouts
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWorkoutsQuery {
    /// Workouts assigned to this athlete, directly or through a team
    #[serde(default)]
    pub athlete_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    /// Only workouts with no owner
    #[serde(default)]
    pub template: Option<bool>,
}

fn workout_not_found() -> ApiError {
    ApiError::not_found("Workout not found")
}

/// Validate a create/update payload and assign ids to new blocks and exercises.
async fn validate_workout(pool: &SqlitePool, body: WorkoutInput) -> Result<NewWorkout, ApiError> {
    let name = required(body.name, "name")?;
    let date = required(body.date, "date")?;
    chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("date must be formatted YYYY-MM-DD"))?;

    let athlete_id = optional(body.athlete_id);
    if let Some(athlete_id) = &athlete_id {
        if !db::athlete_exists(pool, athlete_id).await? {
            return Err(ApiError::not_found("Athlete not found"));
        }
    }
    let team_id = optional(body.team_id);
    if let Some(team_id) = &team_id {
        if !db::team_exists(pool, team_id).await? {
            return Err(ApiError::not_found("Team not found"));
        }
    }

    let mut seen = HashSet::new();
    let mut unique_id = |id: Option<String>| -> Result<String, ApiError> {
        let id = optional(id).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if !seen.insert(id.clone()) {
            return Err(ApiError::bad_request(format!("duplicate id {} in workout", id)));
        }
        Ok(id)
    };

    let mut blocks = Vec::with_capacity(body.blocks.len());
    for (block_index, block) in body.blocks.into_iter().enumerate() {
        let block_id = unique_id(block.id)?;
        let block_name = optional(block.name).unwrap_or_else(|| format!("Block {}", block_index + 1));

        let mut exercises = Vec::with_capacity(block.exercises.len());
        for exercise in block.exercises {
            let sets = exercise.sets.unwrap_or(0);
            if sets < 0 {
                return Err(ApiError::bad_request("sets cannot be negative"));
            }
            exercises.push(NewBlockExercise {
                id: unique_id(exercise.id)?,
                exercise_id: optional(exercise.exercise_id),
                name: required(exercise.name, "exercise name")?,
                sets,
                reps: optional(exercise.reps),
                weight: optional(exercise.weight),
                notes: optional(exercise.notes),
            });
        }

        blocks.push(NewBlock {
            id: block_id,
            name: block_name,
            exercises,
        });
    }

    Ok(NewWorkout {
        name,
        date,
        athlete_id,
        team_id,
        blocks,
    })
}

// GET /api/workouts?athleteId=|teamId=|template=true
pub async fn get_workouts(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListWorkoutsQuery>,
) -> Result<Json<Vec<WorkoutSummary>>, ApiError> {
    let athlete_id = optional(params.athlete_id);
    let team_id = optional(params.team_id);

    let filter = if let Some(athlete_id) = &athlete_id {
        WorkoutFilter::Athlete(athlete_id)
    } else if let Some(team_id) = &team_id {
        WorkoutFilter::Team(team_id)
    } else if params.template == Some(true) {
        WorkoutFilter::Templates
    } else {
        WorkoutFilter::All
    };

    let rows = db::get_workouts(&pool, filter).await?;

    let summaries = match &athlete_id {
        Some(athlete_id) => {
            let completed: HashSet<String> = db::get_completed_workout_ids(&pool, athlete_id)
                .await?
                .into_iter()
                .collect();
            rows.iter()
                .map(|r| r.to_summary(Some(completed.contains(&r.id))))
                .collect()
        }
        None => rows.iter().map(|r| r.to_summary(None)).collect(),
    };

    Ok(Json(summaries))
}

// POST /api/workouts - Create a workout with its blocks and exercises
pub async fn create_workout(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<WorkoutInput>,
) -> Result<(StatusCode, Json<Workout>), ApiError> {
    let workout = validate_workout(&pool, body).await?;
    let workout_id = db::insert_workout(&pool, &workout).await?;
    tracing::info!("Created workout {} with {} blocks", workout_id, workout.blocks.len());

    let created = db::get_workout(&pool, &workout_id)
        .await?
        .ok_or_else(workout_not_found)?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/workouts/:id - Workout with ordered blocks and exercises
pub async fn get_workout_by_id(
    State(pool): State<SqlitePool>,
    Path(workout_id): Path<String>,
) -> Result<Json<Workout>, ApiError> {
    let workout = db::get_workout(&pool, &workout_id)
        .await?
        .ok_or_else(workout_not_found)?;

    Ok(Json(workout))
}

// PUT /api/workouts/:id - Replace header and block tree
pub async fn update_workout(
    State(pool): State<SqlitePool>,
    Path(workout_id): Path<String>,
    ApiJson(body): ApiJson<WorkoutInput>,
) -> Result<Json<Workout>, ApiError> {
    let workout = validate_workout(&pool, body).await?;

    if !db::replace_workout(&pool, &workout_id, &workout).await? {
        return Err(workout_not_found());
    }

    let updated = db::get_workout(&pool, &workout_id)
        .await?
        .ok_or_else(workout_not_found)?;

    Ok(Json(updated))
}

// DELETE /api/workouts/:id
pub async fn delete_workout(
    State(pool): State<SqlitePool>,
    Path(workout_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !db::delete_workout(&pool, &workout_id).await? {
        return Err(workout_not_found());
    }

    tracing::info!("Deleted workout {}", workout_id);
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/workouts/:id/completion?athleteId= - Live completion breakdown
pub async fn get_workout_completion(
    State(pool): State<SqlitePool>,
    Path(workout_id): Path<String>,
    Query(params): Query<AthleteQuery>,
) -> Result<Json<WorkoutProgress>, ApiError> {
    let athlete_id = required(params.athlete_id, "athleteId")?;

    let progress = compute_progress(&pool, &workout_id, &athlete_id)
        .await?
        .ok_or_else(workout_not_found)?;

    Ok(Json(progress))
}
