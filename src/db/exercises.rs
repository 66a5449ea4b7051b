use sqlx::sqlite::SqlitePool;

use super::{is_unique_violation, now};
use crate::error::ApiError;
use crate::models::{Exercise, NewExercise};

/// Upper bound on insert attempts when concurrent creations race for the same id.
pub const MAX_ID_ATTEMPTS: u32 = 5;

/// List the library in numeric id order, optionally filtered.
pub async fn get_all_exercises(
    pool: &SqlitePool,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<Exercise>, sqlx::Error> {
    let pattern = search.map(|s| format!("%{}%", escape_like(s)));
    sqlx::query_as::<_, Exercise>(
        r#"SELECT * FROM exercises
           WHERE (?1 IS NULL OR category = ?1 COLLATE NOCASE)
             AND (?2 IS NULL OR name LIKE ?2 ESCAPE '\')
           ORDER BY CAST(id AS INTEGER)"#,
    )
    .bind(category)
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Make `%`, `_` and `\` match literally inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn get_exercise_by_id(pool: &SqlitePool, exercise_id: &str) -> Result<Option<Exercise>, sqlx::Error> {
    sqlx::query_as::<_, Exercise>(r#"SELECT * FROM exercises WHERE id = ?"#)
        .bind(exercise_id)
        .fetch_optional(pool)
        .await
}

/// Next sequential id: highest numeric id + 1, or 1 for an empty library.
pub async fn next_exercise_id(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let max: Option<i64> = sqlx::query_scalar(r#"SELECT MAX(CAST(id AS INTEGER)) FROM exercises"#)
        .fetch_one(pool)
        .await?;
    Ok(max.unwrap_or(0) + 1)
}

pub async fn insert_exercise(pool: &SqlitePool, exercise: &NewExercise) -> Result<Exercise, ApiError> {
    let candidate = next_exercise_id(pool).await?;
    insert_exercise_from(pool, candidate, exercise).await
}

/// Try `candidate`, `candidate + 1`, ... until an insert does not collide.
pub async fn insert_exercise_from(
    pool: &SqlitePool,
    mut candidate: i64,
    exercise: &NewExercise,
) -> Result<Exercise, ApiError> {
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let result = sqlx::query_as::<_, Exercise>(
            r#"INSERT INTO exercises (id, name, video_url, category, instructions, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(candidate.to_string())
        .bind(&exercise.name)
        .bind(&exercise.video_url)
        .bind(&exercise.category)
        .bind(&exercise.instructions)
        .bind(now())
        .fetch_one(pool)
        .await;

        match result {
            Ok(created) => return Ok(created),
            Err(err) if is_unique_violation(&err) => {
                tracing::warn!("Exercise id {} already taken (attempt {}), retrying", candidate, attempt);
                candidate += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(ApiError::IdAllocationExhausted { attempts: MAX_ID_ATTEMPTS })
}

pub async fn update_exercise(
    pool: &SqlitePool,
    exercise_id: &str,
    name: Option<&str>,
    video_url: Option<&str>,
    category: Option<&str>,
    instructions: Option<&str>,
) -> Result<Option<Exercise>, sqlx::Error> {
    sqlx::query_as::<_, Exercise>(
        r#"UPDATE exercises
           SET name = COALESCE(?, name),
               video_url = COALESCE(?, video_url),
               category = COALESCE(?, category),
               instructions = COALESCE(?, instructions)
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(name)
    .bind(video_url)
    .bind(category)
    .bind(instructions)
    .bind(exercise_id)
    .fetch_optional(pool)
    .await
}

/// Delete an exercise and re-pack the remaining ids to 1..N.
///
/// Rows are renumbered in ascending numeric order, so each new id is never
/// greater than the old one and the target slot is always free. Block
/// exercises that reference the library follow their exercise to its new id.
pub async fn delete_exercise(pool: &SqlitePool, exercise_id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query(r#"DELETE FROM exercises WHERE id = ?"#)
        .bind(exercise_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(r#"UPDATE block_exercises SET exercise_id = NULL WHERE exercise_id = ?"#)
        .bind(exercise_id)
        .execute(&mut *tx)
        .await?;

    let remaining: Vec<String> =
        sqlx::query_scalar(r#"SELECT id FROM exercises ORDER BY CAST(id AS INTEGER)"#)
            .fetch_all(&mut *tx)
            .await?;

    let mut moved = 0;
    for (index, old_id) in remaining.iter().enumerate() {
        let new_id = (index + 1).to_string();
        if *old_id == new_id {
            continue;
        }

        sqlx::query(r#"UPDATE exercises SET id = ? WHERE id = ?"#)
            .bind(&new_id)
            .bind(old_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"UPDATE block_exercises SET exercise_id = ? WHERE exercise_id = ?"#)
            .bind(&new_id)
            .bind(old_id)
            .execute(&mut *tx)
            .await?;
        moved += 1;
    }

    tx.commit().await?;
    tracing::info!("Deleted exercise {}, re-packed {} ids", exercise_id, moved);

    Ok(true)
}

/// Attach an uploaded video to an exercise
pub async fn set_exercise_video(pool: &SqlitePool, exercise_id: &str, video_url: &str) -> Result<Option<Exercise>, sqlx::Error> {
    sqlx::query_as::<_, Exercise>(r#"UPDATE exercises SET video_url = ? WHERE id = ? RETURNING *"#)
        .bind(video_url)
        .bind(exercise_id)
        .fetch_optional(pool)
        .await
}
