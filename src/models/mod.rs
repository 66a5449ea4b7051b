use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Athletes
// ---------------------------------------------------------------------------

/// Athlete row from the database, including credentials.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AthleteRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub login_token: String,
    pub created_at: String,
}

impl AthleteRow {
    /// Public identity, safe to return from any endpoint.
    pub fn to_athlete(&self) -> Athlete {
        Athlete {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at.clone(),
        }
    }

    /// Identity plus login token; only returned by create and login.
    pub fn to_credentials(&self) -> AthleteCredentials {
        AthleteCredentials {
            athlete: self.to_athlete(),
            login_token: self.login_token.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteCredentials {
    #[serde(flatten)]
    pub athlete: Athlete,
    pub login_token: String,
}

/// Athlete with the teams they belong to
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteDetail {
    #[serde(flatten)]
    pub athlete: Athlete,
    pub teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAthlete {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAthlete {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login with either a previously issued token or email + password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    pub valid: bool,
    pub athlete: Athlete,
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Team list entry with its member count
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub athlete_count: i64,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub joined_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub athletes: Vec<TeamMember>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub team_id: String,
    pub athlete_id: String,
    pub joined_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTeamAthlete {
    pub athlete_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Exercise library
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub video_url: Option<String>,
    pub category: Option<String>,
    pub instructions: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInput {
    pub name: Option<String>,
    pub video_url: Option<String>,
    pub category: Option<String>,
    pub instructions: Option<String>,
}

/// Validated exercise fields ready to insert
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub video_url: Option<String>,
    pub category: Option<String>,
    pub instructions: Option<String>,
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

/// Workout header row from SQLite database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutRow {
    pub id: String,
    pub name: String,
    pub date: String,
    pub athlete_id: Option<String>,
    pub team_id: Option<String>,
    pub created_at: String,
}

impl WorkoutRow {
    pub fn is_template(&self) -> bool {
        self.athlete_id.is_none() && self.team_id.is_none()
    }

    pub fn to_summary(&self, completed: Option<bool>) -> WorkoutSummary {
        WorkoutSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            date: self.date.clone(),
            athlete_id: self.athlete_id.clone(),
            team_id: self.team_id.clone(),
            is_template: self.is_template(),
            created_at: self.created_at.clone(),
            completed,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlockRow {
    pub id: String,
    pub workout_id: String,
    pub name: String,
    pub order_index: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlockExercise {
    pub id: String,
    pub block_id: String,
    pub exercise_id: Option<String>,
    pub name: String,
    pub sets: i64,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
    pub order_index: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub name: String,
    pub order_index: i64,
    pub exercises: Vec<BlockExercise>,
}

/// Full workout with ordered blocks and exercises
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub date: String,
    pub athlete_id: Option<String>,
    pub team_id: Option<String>,
    pub is_template: bool,
    pub created_at: String,
    pub blocks: Vec<Block>,
}

impl Workout {
    /// Build the nested view. `blocks` and `exercises` must already be sorted by order index.
    pub fn assemble(row: WorkoutRow, blocks: Vec<BlockRow>, exercises: Vec<BlockExercise>) -> Self {
        let mut blocks: Vec<Block> = blocks
            .into_iter()
            .map(|b| Block {
                id: b.id,
                name: b.name,
                order_index: b.order_index,
                exercises: Vec::new(),
            })
            .collect();

        for exercise in exercises {
            if let Some(block) = blocks.iter_mut().find(|b| b.id == exercise.block_id) {
                block.exercises.push(exercise);
            }
        }

        Workout {
            is_template: row.is_template(),
            id: row.id,
            name: row.name,
            date: row.date,
            athlete_id: row.athlete_id,
            team_id: row.team_id,
            created_at: row.created_at,
            blocks,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub id: String,
    pub name: String,
    pub date: String,
    pub athlete_id: Option<String>,
    pub team_id: Option<String>,
    pub is_template: bool,
    pub created_at: String,
    /// Persisted completion fact; only present when listing for an athlete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutInput {
    pub name: Option<String>,
    pub date: Option<String>,
    pub athlete_id: Option<String>,
    pub team_id: Option<String>,
    #[serde(default)]
    pub blocks: Vec<BlockInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInput {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub exercises: Vec<BlockExerciseInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockExerciseInput {
    pub id: Option<String>,
    pub exercise_id: Option<String>,
    pub name: Option<String>,
    pub sets: Option<i64>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub reps: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub weight: Option<String>,
    pub notes: Option<String>,
}

/// Validated workout ready to write; ids are already assigned.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub name: String,
    pub date: String,
    pub athlete_id: Option<String>,
    pub team_id: Option<String>,
    pub blocks: Vec<NewBlock>,
}

#[derive(Debug, Clone)]
pub struct NewBlock {
    pub id: String,
    pub name: String,
    pub exercises: Vec<NewBlockExercise>,
}

#[derive(Debug, Clone)]
pub struct NewBlockExercise {
    pub id: String,
    pub exercise_id: Option<String>,
    pub name: String,
    pub sets: i64,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub notes: Option<String>,
}

/// Prescriptions like reps and weight arrive as either `8` or `"8-10"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// Sets and notes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: String,
    pub workout_id: String,
    pub block_exercise_id: String,
    pub athlete_id: String,
    pub set_number: i64,
    pub weight: Option<f64>,
    pub reps: Option<i64>,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub updated_at: String,
}

/// Composite key of a logged set; doubles as the upsert key.
pub fn set_id(block_exercise_id: &str, athlete_id: &str, set_number: i64) -> String {
    format!("{}_{}_{}", block_exercise_id, athlete_id, set_number)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSetsRequest {
    pub athlete_id: Option<String>,
    #[serde(default)]
    pub sets: Vec<SetInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInput {
    pub set_number: i64,
    pub weight: Option<f64>,
    pub reps: Option<i64>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseNote {
    pub id: String,
    pub workout_id: String,
    pub block_exercise_id: String,
    pub athlete_id: String,
    pub note: String,
    pub updated_at: String,
}

/// Composite key of a note: one per (block exercise, workout, athlete).
pub fn note_id(block_exercise_id: &str, workout_id: &str, athlete_id: &str) -> String {
    format!("{}_{}_{}", block_exercise_id, workout_id, athlete_id)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNoteRequest {
    pub athlete_id: Option<String>,
    pub note: Option<String>,
}

/// `?athleteId=` selector shared by the per-athlete workout endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteQuery {
    pub athlete_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpload {
    pub url: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
}
