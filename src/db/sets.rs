use sqlx::sqlite::SqlitePool;

use super::now;
use crate::models::{set_id, ExerciseSet, SetInput};

pub async fn get_sets(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
    athlete_id: &str,
) -> Result<Vec<ExerciseSet>, sqlx::Error> {
    sqlx::query_as::<_, ExerciseSet>(
        r#"SELECT * FROM exercise_sets
           WHERE workout_id = ? AND block_exercise_id = ? AND athlete_id = ?
           ORDER BY set_number"#,
    )
    .bind(workout_id)
    .bind(block_exercise_id)
    .bind(athlete_id)
    .fetch_all(pool)
    .await
}

/// Make the athlete's logged sets for one block exercise match `sets`.
///
/// Listed sets are upserted on their composite id; the athlete's other sets
/// for this exercise are removed. A set keeps its original `completed_at`
/// while it stays completed.
pub async fn save_sets(
    pool: &SqlitePool,
    workout_id: &str,
    block_exercise_id: &str,
    athlete_id: &str,
    sets: &[SetInput],
) -> Result<Vec<ExerciseSet>, sqlx::Error> {
    let timestamp = now();
    let mut tx = pool.begin().await?;

    for set in sets {
        let completed_at = set.completed.then(|| timestamp.clone());
        sqlx::query(
            r#"INSERT INTO exercise_sets
                   (id, workout_id, block_exercise_id, athlete_id, set_number,
                    weight, reps, completed, completed_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   workout_id = excluded.workout_id,
                   weight = excluded.weight,
                   reps = excluded.reps,
                   completed = excluded.completed,
                   completed_at = CASE
                       WHEN excluded.completed THEN COALESCE(exercise_sets.completed_at, excluded.completed_at)
                       ELSE NULL
                   END,
                   updated_at = excluded.updated_at"#,
        )
        .bind(set_id(block_exercise_id, athlete_id, set.set_number))
        .bind(workout_id)
        .bind(block_exercise_id)
        .bind(athlete_id)
        .bind(set.set_number)
        .bind(set.weight)
        .bind(set.reps)
        .bind(set.completed)
        .bind(completed_at)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await?;
    }

    let existing: Vec<i64> = sqlx::query_scalar(
        r#"SELECT set_number FROM exercise_sets
           WHERE workout_id = ? AND block_exercise_id = ? AND athlete_id = ?"#,
    )
    .bind(workout_id)
    .bind(block_exercise_id)
    .bind(athlete_id)
    .fetch_all(&mut *tx)
    .await?;

    for stale in existing.into_iter().filter(|n| !sets.iter().any(|s| s.set_number == *n)) {
        sqlx::query(r#"DELETE FROM exercise_sets WHERE id = ?"#)
            .bind(set_id(block_exercise_id, athlete_id, stale))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    get_sets(pool, workout_id, block_exercise_id, athlete_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    async fn seed(pool: &SqlitePool) {
        sqlx::query(
            r#"INSERT INTO athletes (id, name, email, password_hash, login_token, created_at)
               VALUES ('ath', 'Sam', 'sam@example.com', 'x', 'tok', 'now')"#,
        )
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(r#"INSERT INTO workouts (id, name, date, created_at) VALUES ('w1', 'W', '2025-01-01', 'now')"#)
            .execute(pool)
            .await
            .unwrap();
    }

    fn set(set_number: i64, completed: bool) -> SetInput {
        SetInput { set_number, weight: Some(60.0), reps: Some(5), completed }
    }

    #[tokio::test]
    async fn test_save_upserts_and_prunes() {
        let pool = test_pool().await;
        seed(&pool).await;

        let saved = save_sets(&pool, "w1", "be1", "ath", &[set(1, true), set(2, true), set(3, false)])
            .await
            .unwrap();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0].id, "be1_ath_1");
        assert!(saved[0].completed_at.is_some());
        assert!(saved[2].completed_at.is_none());
        let first_completed_at = saved[0].completed_at.clone();

        let saved = save_sets(&pool, "w1", "be1", "ath", &[set(1, true), set(2, false)]).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].completed_at, first_completed_at);
        assert!(!saved[1].completed);
        assert!(saved[1].completed_at.is_none());
    }

    #[tokio::test]
    async fn test_sets_are_scoped_per_exercise() {
        let pool = test_pool().await;
        seed(&pool).await;

        save_sets(&pool, "w1", "be1", "ath", &[set(1, true)]).await.unwrap();
        save_sets(&pool, "w1", "be2", "ath", &[set(1, true), set(2, true)]).await.unwrap();
        save_sets(&pool, "w1", "be1", "ath", &[]).await.unwrap();

        assert!(get_sets(&pool, "w1", "be1", "ath").await.unwrap().is_empty());
        assert_eq!(get_sets(&pool, "w1", "be2", "ath").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reused_id_moves_set_to_new_workout() {
        let pool = test_pool().await;
        seed(&pool).await;
        sqlx::query(r#"INSERT INTO workouts (id, name, date, created_at) VALUES ('w2', 'W2', '2025-01-02', 'now')"#)
            .execute(&pool)
            .await
            .unwrap();

        save_sets(&pool, "w1", "be1", "ath", &[set(1, true)]).await.unwrap();
        let saved = save_sets(&pool, "w2", "be1", "ath", &[set(1, true)]).await.unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].workout_id, "w2");
        assert!(get_sets(&pool, "w1", "be1", "ath").await.unwrap().is_empty());
    }
}
