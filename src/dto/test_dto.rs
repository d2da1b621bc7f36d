use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{not_blank, option_letter};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionPayload {
    #[validate(custom(function = "not_blank"))]
    pub question_text: String,
    #[validate(custom(function = "not_blank"))]
    pub option_a: String,
    #[validate(custom(function = "not_blank"))]
    pub option_b: String,
    #[validate(custom(function = "not_blank"))]
    pub option_c: String,
    #[validate(custom(function = "not_blank"))]
    pub option_d: String,
    #[validate(custom(function = "option_letter"))]
    pub correct_answer: String,
    #[serde(default = "default_points")]
    #[validate(range(min = 1))]
    pub points: i32,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: i32,
    #[validate(range(min = 0, max = 100, message = "Passing score must be between 0 and 100"))]
    pub passing_score: i32,
    #[serde(default)]
    pub calculator_allowed: bool,
    pub class_id: Option<Uuid>,
    #[validate(length(min = 1, message = "At least one question is required"), nested)]
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTestPayload {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: i32,
    #[validate(range(min = 0, max = 100, message = "Passing score must be between 0 and 100"))]
    pub passing_score: i32,
    /// Absent leaves the restriction alone; explicit `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub class_id: Option<Option<Uuid>>,
    #[validate(length(min = 1, message = "At least one question is required"), nested)]
    pub questions: Option<Vec<QuestionPayload>>,
}

pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTestResponse {
    pub test_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SubmitTestRequest {
    #[serde(default)]
    pub answers: HashMap<String, serde_json::Value>,
    pub time_taken_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitTestResponse {
    pub attempt_id: Uuid,
    pub score: i32,
    pub passed: bool,
}
