use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One attempt on a teacher's test, with student and class context.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeacherResult {
    pub attempt_id: Uuid,
    pub score: i32,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
    pub class_id: Option<Uuid>,
    pub class_name: Option<String>,
    pub test_id: Uuid,
    pub test_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub attempt_id: Uuid,
    pub score: i32,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
    pub student_id: Uuid,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentAttempt {
    pub id: Uuid,
    pub score: i32,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
    pub student_name: String,
    pub test_title: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeacherStatsRow {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub teacher_email: String,
    pub tests_count: i64,
    pub attempts_count: i64,
    pub avg_score: Option<Decimal>,
    pub passed_count: i64,
}
