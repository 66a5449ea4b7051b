use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sqlx::sqlite::SqlitePool;

use super::{optional, required};
use crate::db;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{AddTeamAthlete, Membership, Team, TeamDetail, TeamInput, TeamSummary};

fn team_not_found() -> ApiError {
    ApiError::not_found("Team not found")
}

// GET /api/teams - List all teams with member counts
pub async fn get_teams(State(pool): State<SqlitePool>) -> Result<Json<Vec<TeamSummary>>, ApiError> {
    let teams = db::get_all_teams(&pool).await?;
    Ok(Json(teams))
}

// POST /api/teams
pub async fn create_team(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<TeamInput>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let name = required(body.name, "name")?;
    let description = optional(body.description);

    let team = db::insert_team(&pool, &name, description.as_deref()).await?;
    tracing::info!("Created team {} ({})", team.id, team.name);

    Ok((StatusCode::CREATED, Json(team)))
}

// GET /api/teams/:id - Team with its athletes
pub async fn get_team_by_id(
    State(pool): State<SqlitePool>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamDetail>, ApiError> {
    let team = db::get_team_by_id(&pool, &team_id)
        .await?
        .ok_or_else(team_not_found)?;
    let athletes = db::get_team_members(&pool, &team_id).await?;

    Ok(Json(TeamDetail { team, athletes }))
}

// PUT /api/teams/:id
pub async fn update_team(
    State(pool): State<SqlitePool>,
    Path(team_id): Path<String>,
    ApiJson(body): ApiJson<TeamInput>,
) -> Result<Json<Team>, ApiError> {
    let name = optional(body.name);
    let description = optional(body.description);

    let team = db::update_team(&pool, &team_id, name.as_deref(), description.as_deref())
        .await?
        .ok_or_else(team_not_found)?;

    Ok(Json(team))
}

// DELETE /api/teams/:id
pub async fn delete_team(
    State(pool): State<SqlitePool>,
    Path(team_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !db::delete_team(&pool, &team_id).await? {
        return Err(team_not_found());
    }

    tracing::info!("Deleted team {}", team_id);
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/teams/:id/athletes - Add an athlete to the team
pub async fn add_team_athlete(
    State(pool): State<SqlitePool>,
    Path(team_id): Path<String>,
    ApiJson(body): ApiJson<AddTeamAthlete>,
) -> Result<(StatusCode, Json<Membership>), ApiError> {
    let athlete_id = required(body.athlete_id, "athleteId")?;

    if !db::team_exists(&pool, &team_id).await? {
        return Err(team_not_found());
    }
    if !db::athlete_exists(&pool, &athlete_id).await? {
        return Err(ApiError::not_found("Athlete not found"));
    }
    if db::is_team_member(&pool, &team_id, &athlete_id).await? {
        return Err(ApiError::Conflict("Athlete is already on this team".to_string()));
    }

    // Concurrent duplicates hit the unique pair constraint, which maps to 409.
    let membership = db::add_team_athlete(&pool, &team_id, &athlete_id).await?;
    tracing::info!("Added athlete {} to team {}", athlete_id, team_id);

    Ok((StatusCode::CREATED, Json(membership)))
}

// DELETE /api/teams/:id/athletes/:athleteId
pub async fn remove_team_athlete(
    State(pool): State<SqlitePool>,
    Path((team_id, athlete_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    if !db::remove_team_athlete(&pool, &team_id, &athlete_id).await? {
        return Err(ApiError::not_found("Athlete is not on this team"));
    }

    Ok(StatusCode::NO_CONTENT)
}
