//! Workout completion: per-exercise status from logged sets, rolled up to a
//! single "athlete finished this workout" fact.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::db;
use crate::models::Workout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ExerciseStatus {
    pub fn from_counts(completed_sets: i64, planned_sets: i64) -> Self {
        if planned_sets > 0 && completed_sets >= planned_sets {
            ExerciseStatus::Completed
        } else if completed_sets > 0 {
            ExerciseStatus::InProgress
        } else {
            ExerciseStatus::NotStarted
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
    pub block_exercise_id: String,
    pub name: String,
    pub planned_sets: i64,
    pub completed_sets: i64,
    pub status: ExerciseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockProgress {
    pub block_id: String,
    pub name: String,
    pub exercises: Vec<ExerciseProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProgress {
    pub workout_id: String,
    pub athlete_id: String,
    pub completed: bool,
    pub blocks: Vec<BlockProgress>,
    /// When the persisted completion fact was recorded, if there is one
    pub completed_at: Option<String>,
}

/// Walk blocks and exercises in order and derive their status.
///
/// `completed_counts` maps block exercise id to the athlete's number of
/// completed sets. A workout without any exercise is never complete.
pub fn derive_progress(workout: &Workout, athlete_id: &str, completed_counts: &HashMap<String, i64>) -> WorkoutProgress {
    let blocks: Vec<BlockProgress> = workout
        .blocks
        .iter()
        .map(|block| BlockProgress {
            block_id: block.id.clone(),
            name: block.name.clone(),
            exercises: block
                .exercises
                .iter()
                .map(|exercise| {
                    let completed_sets = completed_counts.get(&exercise.id).copied().unwrap_or(0);
                    ExerciseProgress {
                        block_exercise_id: exercise.id.clone(),
                        name: exercise.name.clone(),
                        planned_sets: exercise.sets,
                        completed_sets,
                        status: ExerciseStatus::from_counts(completed_sets, exercise.sets),
                    }
                })
                .collect(),
        })
        .collect();

    let mut exercises = blocks.iter().flat_map(|b| b.exercises.iter()).peekable();
    let completed = exercises.peek().is_some()
        && exercises.all(|e| e.status == ExerciseStatus::Completed);

    WorkoutProgress {
        workout_id: workout.id.clone(),
        athlete_id: athlete_id.to_string(),
        completed,
        blocks,
        completed_at: None,
    }
}

/// Compute progress from the current rows. `None` if the workout does not exist.
pub async fn compute_progress(
    pool: &SqlitePool,
    workout_id: &str,
    athlete_id: &str,
) -> Result<Option<WorkoutProgress>, sqlx::Error> {
    let Some(workout) = db::get_workout(pool, workout_id).await? else {
        return Ok(None);
    };
    let counts = db::get_completed_set_counts(pool, workout_id, athlete_id).await?;
    let mut progress = derive_progress(&workout, athlete_id, &counts);
    progress.completed_at = db::get_completion_record(pool, workout_id, athlete_id).await?;
    Ok(Some(progress))
}

// One refresh at a time: the last one to run has read the latest sets.
static REFRESH_LOCK: Mutex<()> = Mutex::const_new(());

/// Recompute the completion fact and persist it: record it when complete,
/// drop a stale record otherwise. Returns the recomputed value.
pub async fn refresh_completion(pool: &SqlitePool, workout_id: &str, athlete_id: &str) -> Result<bool, sqlx::Error> {
    let _guard = REFRESH_LOCK.lock().await;

    let Some(workout) = db::get_workout(pool, workout_id).await? else {
        return Ok(false);
    };
    let counts = db::get_completed_set_counts(pool, workout_id, athlete_id).await?;
    let completed = derive_progress(&workout, athlete_id, &counts).completed;

    if completed {
        db::record_completion(pool, workout_id, athlete_id).await?;
    } else {
        db::clear_completion(pool, workout_id, athlete_id).await?;
    }

    tracing::debug!("Workout {} completion for athlete {}: {}", workout_id, athlete_id, completed);
    Ok(completed)
}

/// Fire-and-forget refresh after a set save. Errors are logged, never returned.
pub fn spawn_refresh(pool: SqlitePool, workout_id: String, athlete_id: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = refresh_completion(&pool, &workout_id, &athlete_id).await {
            tracing::warn!(
                "Failed to refresh completion for workout {} athlete {}: {}",
                workout_id,
                athlete_id,
                e
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, BlockExercise};

    fn exercise(id: &str, sets: i64) -> BlockExercise {
        BlockExercise {
            id: id.to_string(),
            block_id: "b".to_string(),
            exercise_id: None,
            name: id.to_string(),
            sets,
            reps: None,
            weight: None,
            notes: None,
            order_index: 0,
        }
    }

    fn workout(blocks: Vec<Vec<BlockExercise>>) -> Workout {
        Workout {
            id: "w".to_string(),
            name: "W".to_string(),
            date: "2025-01-01".to_string(),
            athlete_id: None,
            team_id: None,
            is_template: true,
            created_at: String::new(),
            blocks: blocks
                .into_iter()
                .enumerate()
                .map(|(i, exercises)| Block {
                    id: format!("b{}", i),
                    name: format!("Block {}", i),
                    order_index: i as i64,
                    exercises,
                })
                .collect(),
        }
    }

    fn counts(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_status_from_counts() {
        assert_eq!(ExerciseStatus::from_counts(0, 3), ExerciseStatus::NotStarted);
        assert_eq!(ExerciseStatus::from_counts(2, 3), ExerciseStatus::InProgress);
        assert_eq!(ExerciseStatus::from_counts(3, 3), ExerciseStatus::Completed);
        assert_eq!(ExerciseStatus::from_counts(4, 3), ExerciseStatus::Completed);
        // Nothing planned can't be completed, but logged work still shows as progress.
        assert_eq!(ExerciseStatus::from_counts(0, 0), ExerciseStatus::NotStarted);
        assert_eq!(ExerciseStatus::from_counts(1, 0), ExerciseStatus::InProgress);
    }

    #[test]
    fn test_workout_complete_only_when_every_exercise_is() {
        let w = workout(vec![vec![exercise("a", 2)], vec![exercise("b", 3), exercise("c", 1)]]);

        let all = derive_progress(&w, "ath", &counts(&[("a", 2), ("b", 3), ("c", 1)]));
        assert!(all.completed);

        let partial = derive_progress(&w, "ath", &counts(&[("a", 2), ("b", 2), ("c", 1)]));
        assert!(!partial.completed);
        assert_eq!(partial.blocks[1].exercises[0].status, ExerciseStatus::InProgress);
        assert_eq!(partial.blocks[0].exercises[0].status, ExerciseStatus::Completed);
    }

    #[test]
    fn test_empty_workout_is_not_complete() {
        assert!(!derive_progress(&workout(vec![]), "ath", &HashMap::new()).completed);
        assert!(!derive_progress(&workout(vec![vec![]]), "ath", &HashMap::new()).completed);
    }

    #[test]
    fn test_zero_planned_sets_blocks_completion() {
        let w = workout(vec![vec![exercise("a", 2), exercise("stretch", 0)]]);
        assert!(!derive_progress(&w, "ath", &counts(&[("a", 2)])).completed);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ExerciseStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
