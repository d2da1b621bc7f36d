use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The four option slots every question carries.
pub const OPTION_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

pub fn is_option_letter(value: &str) -> bool {
    OPTION_LETTERS.contains(&value)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub points: i32,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Question as shown to a test taker; never carries the correct option.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub test_id: Uuid,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AnswerKey {
    pub id: Uuid,
    pub correct_answer: String,
}
