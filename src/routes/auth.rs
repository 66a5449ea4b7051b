use axum::{
    extract::{Path, State},
    response::Json,
};
use sqlx::sqlite::SqlitePool;

use super::{athletes::normalize_email, optional};
use crate::auth::verify_password;
use crate::db;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{AthleteCredentials, LoginRequest, TokenValidation};

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

// POST /api/auth/login - Exchange a login token (or email + password) for identity
pub async fn login(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AthleteCredentials>, ApiError> {
    let athlete = match (optional(body.token), optional(body.email), body.password) {
        (Some(token), _, _) => db::get_athlete_by_token(&pool, &token)
            .await?
            .ok_or_else(invalid_credentials)?,
        (None, Some(email), Some(password)) => {
            let email = normalize_email(&email).map_err(|_| invalid_credentials())?;
            let athlete = db::get_athlete_by_email(&pool, &email)
                .await?
                .ok_or_else(invalid_credentials)?;
            if !verify_password(&password, &athlete.password_hash) {
                return Err(invalid_credentials());
            }
            athlete
        }
        _ => return Err(ApiError::bad_request("token or email and password are required")),
    };

    tracing::info!("Athlete {} logged in", athlete.id);
    Ok(Json(athlete.to_credentials()))
}

// GET /api/auth/validate/:token - Check a login token
pub async fn validate_token(
    State(pool): State<SqlitePool>,
    Path(token): Path<String>,
) -> Result<Json<TokenValidation>, ApiError> {
    let athlete = db::get_athlete_by_token(&pool, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    Ok(Json(TokenValidation {
        valid: true,
        athlete: athlete.to_athlete(),
    }))
}
