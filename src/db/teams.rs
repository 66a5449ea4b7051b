use sqlx::sqlite::SqlitePool;

use super::now;
use crate::models::{Membership, Team, TeamMember, TeamSummary};

// Team queries
pub async fn get_all_teams(pool: &SqlitePool) -> Result<Vec<TeamSummary>, sqlx::Error> {
    sqlx::query_as::<_, TeamSummary>(
        r#"SELECT t.id, t.name, t.description, t.created_at,
                  COUNT(ta.athlete_id) AS athlete_count
           FROM teams t
           LEFT JOIN team_athletes ta ON ta.team_id = t.id
           GROUP BY t.id
           ORDER BY t.name"#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_team_by_id(pool: &SqlitePool, team_id: &str) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(r#"SELECT * FROM teams WHERE id = ?"#)
        .bind(team_id)
        .fetch_optional(pool)
        .await
}

pub async fn team_exists(pool: &SqlitePool, team_id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(r#"SELECT 1 FROM teams WHERE id = ?"#)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_team(pool: &SqlitePool, name: &str, description: Option<&str>) -> Result<Team, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        r#"INSERT INTO teams (id, name, description, created_at)
           VALUES (?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(name)
    .bind(description)
    .bind(now())
    .fetch_one(pool)
    .await
}

pub async fn update_team(
    pool: &SqlitePool,
    team_id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        r#"UPDATE teams
           SET name = COALESCE(?, name),
               description = COALESCE(?, description)
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(name)
    .bind(description)
    .bind(team_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_team(pool: &SqlitePool, team_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM teams WHERE id = ?"#)
        .bind(team_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Membership queries
pub async fn get_team_members(pool: &SqlitePool, team_id: &str) -> Result<Vec<TeamMember>, sqlx::Error> {
    sqlx::query_as::<_, TeamMember>(
        r#"SELECT a.id, a.name, a.email, ta.joined_at
           FROM team_athletes ta
           JOIN athletes a ON a.id = ta.athlete_id
           WHERE ta.team_id = ?
           ORDER BY a.name"#,
    )
    .bind(team_id)
    .fetch_all(pool)
    .await
}

pub async fn is_team_member(pool: &SqlitePool, team_id: &str, athlete_id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        r#"SELECT 1 FROM team_athletes WHERE team_id = ? AND athlete_id = ?"#,
    )
    .bind(team_id)
    .bind(athlete_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Fails with a unique violation when the pair already exists.
pub async fn add_team_athlete(pool: &SqlitePool, team_id: &str, athlete_id: &str) -> Result<Membership, sqlx::Error> {
    sqlx::query_as::<_, Membership>(
        r#"INSERT INTO team_athletes (team_id, athlete_id, joined_at)
           VALUES (?, ?, ?)
           RETURNING team_id, athlete_id, joined_at"#,
    )
    .bind(team_id)
    .bind(athlete_id)
    .bind(now())
    .fetch_one(pool)
    .await
}

pub async fn remove_team_athlete(pool: &SqlitePool, team_id: &str, athlete_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM team_athletes WHERE team_id = ? AND athlete_id = ?"#)
        .bind(team_id)
        .bind(athlete_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
