use std::sync::LazyLock;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use regex::Regex;
use sqlx::sqlite::SqlitePool;

use super::{optional, required};
use crate::auth::{hash_password, issue_login_token};
use crate::db;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{Athlete, AthleteCredentials, AthleteDetail, CreateAthlete, UpdateAthlete};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

pub(crate) fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if !EMAIL.is_match(&email) {
        return Err(ApiError::bad_request("email is not a valid address"));
    }
    Ok(email)
}

fn email_taken() -> ApiError {
    ApiError::Conflict("An athlete with this email already exists".to_string())
}

// GET /api/athletes - List all athletes
pub async fn get_athletes(State(pool): State<SqlitePool>) -> Result<Json<Vec<Athlete>>, ApiError> {
    let athletes = db::get_all_athletes(&pool).await?;
    Ok(Json(athletes.iter().map(|a| a.to_athlete()).collect()))
}

// POST /api/athletes - Register an athlete and issue a login token
pub async fn create_athlete(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<CreateAthlete>,
) -> Result<(StatusCode, Json<AthleteCredentials>), ApiError> {
    let name = required(body.name, "name")?;
    let email = normalize_email(&required(body.email, "email")?)?;
    let password = required(body.password, "password")?;

    if db::get_athlete_by_email(&pool, &email).await?.is_some() {
        return Err(email_taken());
    }

    let password_hash = hash_password(&password)?;
    let athlete = db::insert_athlete(&pool, &name, &email, &password_hash, &issue_login_token())
        .await
        .map_err(|e| if db::is_unique_violation(&e) { email_taken() } else { e.into() })?;

    tracing::info!("Created athlete {}", athlete.id);
    Ok((StatusCode::CREATED, Json(athlete.to_credentials())))
}

// GET /api/athletes/:id - Athlete with their teams
pub async fn get_athlete_by_id(
    State(pool): State<SqlitePool>,
    Path(athlete_id): Path<String>,
) -> Result<Json<AthleteDetail>, ApiError> {
    let athlete = db::get_athlete_by_id(&pool, &athlete_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Athlete not found"))?;
    let teams = db::get_athlete_teams(&pool, &athlete_id).await?;

    Ok(Json(AthleteDetail {
        athlete: athlete.to_athlete(),
        teams,
    }))
}

// PUT /api/athletes/:id - Update name, email and/or password
pub async fn update_athlete(
    State(pool): State<SqlitePool>,
    Path(athlete_id): Path<String>,
    ApiJson(body): ApiJson<UpdateAthlete>,
) -> Result<Json<Athlete>, ApiError> {
    let name = optional(body.name);
    let email = optional(body.email).map(|e| normalize_email(&e)).transpose()?;
    let password_hash = optional(body.password).map(|p| hash_password(&p)).transpose()?;

    if let Some(email) = &email {
        if let Some(existing) = db::get_athlete_by_email(&pool, email).await? {
            if existing.id != athlete_id {
                return Err(email_taken());
            }
        }
    }

    let athlete = db::update_athlete(
        &pool,
        &athlete_id,
        name.as_deref(),
        email.as_deref(),
        password_hash.as_deref(),
    )
    .await
    .map_err(|e| if db::is_unique_violation(&e) { email_taken() } else { e.into() })?
    .ok_or_else(|| ApiError::not_found("Athlete not found"))?;

    Ok(Json(athlete.to_athlete()))
}

// DELETE /api/athletes/:id
pub async fn delete_athlete(
    State(pool): State<SqlitePool>,
    Path(athlete_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !db::delete_athlete(&pool, &athlete_id).await? {
        return Err(ApiError::not_found("Athlete not found"));
    }

    tracing::info!("Deleted athlete {}", athlete_id);
    Ok(StatusCode::NO_CONTENT)
}
