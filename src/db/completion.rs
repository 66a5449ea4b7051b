use std::collections::HashMap;

use sqlx::sqlite::SqlitePool;

use super::now;

/// Completed set count per block exercise for one athlete in one workout
pub async fn get_completed_set_counts(
    pool: &SqlitePool,
    workout_id: &str,
    athlete_id: &str,
) -> Result<HashMap<String, i64>, sqlx::Error> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"SELECT block_exercise_id, COUNT(*)
           FROM exercise_sets
           WHERE workout_id = ? AND athlete_id = ? AND completed = 1
           GROUP BY block_exercise_id"#,
    )
    .bind(workout_id)
    .bind(athlete_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

pub async fn get_completion_record(
    pool: &SqlitePool,
    workout_id: &str,
    athlete_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"SELECT completed_at FROM workout_completions WHERE workout_id = ? AND athlete_id = ?"#,
    )
    .bind(workout_id)
    .bind(athlete_id)
    .fetch_optional(pool)
    .await
}

/// Workouts the athlete has a persisted completion fact for
pub async fn get_completed_workout_ids(pool: &SqlitePool, athlete_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT workout_id FROM workout_completions WHERE athlete_id = ?"#)
        .bind(athlete_id)
        .fetch_all(pool)
        .await
}

/// Keeps the first completion time if the fact is already recorded.
pub async fn record_completion(pool: &SqlitePool, workout_id: &str, athlete_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO workout_completions (workout_id, athlete_id, completed_at)
           VALUES (?, ?, ?)
           ON CONFLICT(workout_id, athlete_id) DO NOTHING"#,
    )
    .bind(workout_id)
    .bind(athlete_id)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn clear_completion(pool: &SqlitePool, workout_id: &str, athlete_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM workout_completions WHERE workout_id = ? AND athlete_id = ?"#)
        .bind(workout_id)
        .bind(athlete_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::completion::{refresh_completion, spawn_refresh};
    use crate::db::test_support::test_pool;
    use crate::db::{self, get_completion_record, insert_workout, save_sets};
    use crate::models::{NewBlock, NewBlockExercise, NewWorkout, SetInput};
    use sqlx::sqlite::SqlitePool;

    async fn seed(pool: &SqlitePool) -> String {
        sqlx::query(
            r#"INSERT INTO athletes (id, name, email, password_hash, login_token, created_at)
               VALUES ('ath', 'Sam', 'sam@example.com', 'x', 'tok', 'now')"#,
        )
        .execute(pool)
        .await
        .unwrap();

        let exercise = |id: &str, sets: i64| NewBlockExercise {
            id: id.to_string(),
            exercise_id: None,
            name: id.to_string(),
            sets,
            reps: None,
            weight: None,
            notes: None,
        };

        insert_workout(
            pool,
            &NewWorkout {
                name: "Full body".to_string(),
                date: "2025-02-01".to_string(),
                athlete_id: Some("ath".to_string()),
                team_id: None,
                blocks: vec![
                    NewBlock { id: "b1".into(), name: "Warm-up".into(), exercises: vec![exercise("row", 1)] },
                    NewBlock { id: "b2".into(), name: "Main".into(), exercises: vec![exercise("squat", 2)] },
                ],
            },
        )
        .await
        .unwrap()
    }

    fn done(set_number: i64) -> SetInput {
        SetInput { set_number, weight: None, reps: Some(5), completed: true }
    }

    #[tokio::test]
    async fn test_refresh_records_then_clears() {
        let pool = test_pool().await;
        let workout_id = seed(&pool).await;

        save_sets(&pool, &workout_id, "row", "ath", &[done(1)]).await.unwrap();
        assert!(!refresh_completion(&pool, &workout_id, "ath").await.unwrap());
        assert!(get_completion_record(&pool, &workout_id, "ath").await.unwrap().is_none());

        save_sets(&pool, &workout_id, "squat", "ath", &[done(1), done(2)]).await.unwrap();
        assert!(refresh_completion(&pool, &workout_id, "ath").await.unwrap());
        assert!(get_completion_record(&pool, &workout_id, "ath").await.unwrap().is_some());
        assert_eq!(db::get_completed_workout_ids(&pool, "ath").await.unwrap(), vec![workout_id.clone()]);

        save_sets(&pool, &workout_id, "squat", "ath", &[done(1)]).await.unwrap();
        assert!(!refresh_completion(&pool, &workout_id, "ath").await.unwrap());
        assert!(get_completion_record(&pool, &workout_id, "ath").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_spawned_refresh_persists() {
        let pool = test_pool().await;
        let workout_id = seed(&pool).await;
        save_sets(&pool, &workout_id, "row", "ath", &[done(1)]).await.unwrap();
        save_sets(&pool, &workout_id, "squat", "ath", &[done(1), done(2)]).await.unwrap();

        spawn_refresh(pool.clone(), workout_id.clone(), "ath".to_string()).await.unwrap();

        assert!(get_completion_record(&pool, &workout_id, "ath").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_missing_workout_is_false() {
        let pool = test_pool().await;
        assert!(!refresh_completion(&pool, "nope", "ath").await.unwrap());
    }
}
