use sqlx::sqlite::SqlitePool;

use super::now;
use crate::models::{AthleteRow, Team};

pub async fn get_all_athletes(pool: &SqlitePool) -> Result<Vec<AthleteRow>, sqlx::Error> {
    sqlx::query_as::<_, AthleteRow>(r#"SELECT * FROM athletes ORDER BY name"#)
        .fetch_all(pool)
        .await
}

pub async fn get_athlete_by_id(pool: &SqlitePool, athlete_id: &str) -> Result<Option<AthleteRow>, sqlx::Error> {
    sqlx::query_as::<_, AthleteRow>(r#"SELECT * FROM athletes WHERE id = ?"#)
        .bind(athlete_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_athlete_by_email(pool: &SqlitePool, email: &str) -> Result<Option<AthleteRow>, sqlx::Error> {
    sqlx::query_as::<_, AthleteRow>(r#"SELECT * FROM athletes WHERE email = ? COLLATE NOCASE"#)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_athlete_by_token(pool: &SqlitePool, token: &str) -> Result<Option<AthleteRow>, sqlx::Error> {
    sqlx::query_as::<_, AthleteRow>(r#"SELECT * FROM athletes WHERE login_token = ?"#)
        .bind(token)
        .fetch_optional(pool)
        .await
}

pub async fn athlete_exists(pool: &SqlitePool, athlete_id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(r#"SELECT 1 FROM athletes WHERE id = ?"#)
        .bind(athlete_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_athlete(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    login_token: &str,
) -> Result<AthleteRow, sqlx::Error> {
    sqlx::query_as::<_, AthleteRow>(
        r#"INSERT INTO athletes (id, name, email, password_hash, login_token, created_at)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(login_token)
    .bind(now())
    .fetch_one(pool)
    .await
}

/// Update only the fields that are `Some`. Returns `None` when the athlete does not exist.
pub async fn update_athlete(
    pool: &SqlitePool,
    athlete_id: &str,
    name: Option<&str>,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> Result<Option<AthleteRow>, sqlx::Error> {
    sqlx::query_as::<_, AthleteRow>(
        r#"UPDATE athletes
           SET name = COALESCE(?, name),
               email = COALESCE(?, email),
               password_hash = COALESCE(?, password_hash)
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(athlete_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_athlete(pool: &SqlitePool, athlete_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM athletes WHERE id = ?"#)
        .bind(athlete_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Teams the athlete is a member of
pub async fn get_athlete_teams(pool: &SqlitePool, athlete_id: &str) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        r#"SELECT t.id, t.name, t.description, t.created_at
           FROM teams t
           JOIN team_athletes ta ON ta.team_id = t.id
           WHERE ta.athlete_id = ?
           ORDER BY t.name"#,
    )
    .bind(athlete_id)
    .fetch_all(pool)
    .await
}
