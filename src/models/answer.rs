use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

/// Recorded answer joined with its question, for result review.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewedAnswer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub answer: Answer,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
}
