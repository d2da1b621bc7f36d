use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub time_taken_seconds: i32,
    pub passed: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attempt: TestAttempt,
    pub student_name: String,
    pub test_title: String,
}
