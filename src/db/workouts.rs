use sqlx::sqlite::{SqliteConnection, SqlitePool};

use super::now;
use crate::models::{BlockExercise, BlockRow, NewBlock, NewWorkout, Workout, WorkoutRow};

/// Which workouts a listing returns
#[derive(Debug, Clone, Copy)]
pub enum WorkoutFilter<'a> {
    All,
    /// Assigned to the athlete directly or through one of their teams
    Athlete(&'a str),
    Team(&'a str),
    Templates,
}

pub async fn get_workouts(pool: &SqlitePool, filter: WorkoutFilter<'_>) -> Result<Vec<WorkoutRow>, sqlx::Error> {
    match filter {
        WorkoutFilter::All => {
            sqlx::query_as::<_, WorkoutRow>(
                r#"SELECT * FROM workouts ORDER BY date DESC, created_at DESC"#,
            )
            .fetch_all(pool)
            .await
        }
        WorkoutFilter::Athlete(athlete_id) => {
            sqlx::query_as::<_, WorkoutRow>(
                r#"SELECT * FROM workouts
                   WHERE athlete_id = ?1
                      OR team_id IN (SELECT team_id FROM team_athletes WHERE athlete_id = ?1)
                   ORDER BY date DESC, created_at DESC"#,
            )
            .bind(athlete_id)
            .fetch_all(pool)
            .await
        }
        WorkoutFilter::Team(team_id) => {
            sqlx::query_as::<_, WorkoutRow>(
                r#"SELECT * FROM workouts WHERE team_id = ? ORDER BY date DESC, created_at DESC"#,
            )
            .bind(team_id)
            .fetch_all(pool)
            .await
        }
        WorkoutFilter::Templates => {
            sqlx::query_as::<_, WorkoutRow>(
                r#"SELECT * FROM workouts
                   WHERE athlete_id IS NULL AND team_id IS NULL
                   ORDER BY name"#,
            )
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn get_workout_row(pool: &SqlitePool, workout_id: &str) -> Result<Option<WorkoutRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutRow>(r#"SELECT * FROM workouts WHERE id = ?"#)
        .bind(workout_id)
        .fetch_optional(pool)
        .await
}

/// Load a workout with its blocks and exercises in stored order.
pub async fn get_workout(pool: &SqlitePool, workout_id: &str) -> Result<Option<Workout>, sqlx::Error> {
    let Some(row) = get_workout_row(pool, workout_id).await? else {
        return Ok(None);
    };

    let blocks = sqlx::query_as::<_, BlockRow>(
        r#"SELECT * FROM workout_blocks WHERE workout_id = ? ORDER BY order_index"#,
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?;

    let exercises = sqlx::query_as::<_, BlockExercise>(
        r#"SELECT be.*
           FROM block_exercises be
           JOIN workout_blocks b ON b.id = be.block_id
           WHERE b.workout_id = ?
           ORDER BY b.order_index, be.order_index"#,
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(Workout::assemble(row, blocks, exercises)))
}

/// Block exercise, but only if it belongs to the given workout
pub async fn get_block_exercise_in_workout(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
) -> Result<Option<BlockExercise>, sqlx::Error> {
    sqlx::query_as::<_, BlockExercise>(
        r#"SELECT be.*
           FROM block_exercises be
           JOIN workout_blocks b ON b.id = be.block_id
           WHERE b.workout_id = ? AND be.id = ?"#,
    )
    .bind(workout_id)
    .bind(block_exercise_id)
    .fetch_optional(pool)
    .await
}

/// Insert header, blocks and exercises in one transaction.
pub async fn insert_workout(pool: &SqlitePool, workout: &NewWorkout) -> Result<String, sqlx::Error> {
    let workout_id = uuid::Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"INSERT INTO workouts (id, name, date, athlete_id, team_id, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&workout_id)
    .bind(&workout.name)
    .bind(&workout.date)
    .bind(&workout.athlete_id)
    .bind(&workout.team_id)
    .bind(now())
    .execute(&mut *tx)
    .await?;

    insert_blocks(&mut tx, &workout_id, &workout.blocks).await?;

    tx.commit().await?;
    Ok(workout_id)
}

/// Replace the header and the whole block tree. Returns false if the workout does not exist.
pub async fn replace_workout(pool: &SqlitePool, workout_id: &str, workout: &NewWorkout) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"UPDATE workouts
           SET name = ?, date = ?, athlete_id = ?, team_id = ?
           WHERE id = ?"#,
    )
    .bind(&workout.name)
    .bind(&workout.date)
    .bind(&workout.athlete_id)
    .bind(&workout.team_id)
    .bind(workout_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    // Cascades to block_exercises; logged sets survive because they key on ids, not rows.
    sqlx::query(r#"DELETE FROM workout_blocks WHERE workout_id = ?"#)
        .bind(workout_id)
        .execute(&mut *tx)
        .await?;

    insert_blocks(&mut tx, workout_id, &workout.blocks).await?;

    // Sets and notes of block exercises dropped from the tree go with them,
    // which also frees their ids for reuse in another workout.
    for table in ["exercise_sets", "exercise_notes"] {
        sqlx::query(&format!(
            r#"DELETE FROM {table}
               WHERE workout_id = ?1
                 AND block_exercise_id NOT IN (
                     SELECT be.id
                     FROM block_exercises be
                     JOIN workout_blocks b ON b.id = be.block_id
                     WHERE b.workout_id = ?1
                 )"#
        ))
        .bind(workout_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

async fn insert_blocks(conn: &mut SqliteConnection, workout_id: &str, blocks: &[NewBlock]) -> Result<(), sqlx::Error> {
    for (block_index, block) in blocks.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO workout_blocks (id, workout_id, name, order_index)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(&block.id)
        .bind(workout_id)
        .bind(&block.name)
        .bind(block_index as i64)
        .execute(&mut *conn)
        .await?;

        for (exercise_index, exercise) in block.exercises.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO block_exercises
                       (id, block_id, exercise_id, name, sets, reps, weight, notes, order_index)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&exercise.id)
            .bind(&block.id)
            .bind(&exercise.exercise_id)
            .bind(&exercise.name)
            .bind(exercise.sets)
            .bind(&exercise.reps)
            .bind(&exercise.weight)
            .bind(&exercise.notes)
            .bind(exercise_index as i64)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

pub async fn delete_workout(pool: &SqlitePool, workout_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM workouts WHERE id = ?"#)
        .bind(workout_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
