use sqlx::sqlite::SqlitePool;

use super::now;
use crate::models::{note_id, ExerciseNote};

pub async fn get_note(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
    athlete_id: &str,
) -> Result<Option<ExerciseNote>, sqlx::Error> {
    sqlx::query_as::<_, ExerciseNote>(r#"SELECT * FROM exercise_notes WHERE id = ?"#)
        .bind(note_id(block_exercise_id, workout_id, athlete_id))
        .fetch_optional(pool)
        .await
}

pub async fn upsert_note(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
    athlete_id: &str,
    note: &str,
) -> Result<ExerciseNote, sqlx::Error> {
    sqlx::query_as::<_, ExerciseNote>(
        r#"INSERT INTO exercise_notes (id, workout_id, block_exercise_id, athlete_id, note, updated_at)
           VALUES (?, ?, ?, ?, ?, ?)
           ON CONFLICT(id) DO UPDATE SET
               workout_id = excluded.workout_id,
               note = excluded.note,
               updated_at = excluded.updated_at
           RETURNING *"#,
    )
    .bind(note_id(block_exercise_id, workout_id, athlete_id))
    .bind(workout_id)
    .bind(block_exercise_id)
    .bind(athlete_id)
    .bind(note)
    .bind(now())
    .fetch_one(pool)
    .await
}

pub async fn delete_note(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
    athlete_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM exercise_notes WHERE id = ?"#)
        .bind(note_id(block_exercise_id, workout_id, athlete_id))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
