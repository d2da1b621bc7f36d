use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::test_dto::double_option;
use crate::models::result::TeacherStatsRow;
use crate::utils::validation::{not_blank, role_name};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "role_name"))]
    pub role: String,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub name: Option<String>,
    #[validate(custom(function = "role_name"))]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub class_id: Option<Option<Uuid>>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClassNameRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_tests: i64,
    pub total_attempts: i64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeacherStats {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub teacher_email: String,
    pub tests_count: i64,
    pub attempts_count: i64,
    pub avg_score: f64,
    pub pass_rate: f64,
}

pub fn decimal_to_f64(value: Option<Decimal>) -> f64 {
    value.and_then(|d| d.to_f64()).unwrap_or(0.0)
}

impl From<TeacherStatsRow> for TeacherStats {
    fn from(row: TeacherStatsRow) -> Self {
        let pass_rate = if row.attempts_count > 0 {
            row.passed_count as f64 / row.attempts_count as f64 * 100.0
        } else {
            0.0
        };
        Self {
            teacher_id: row.teacher_id,
            teacher_name: row.teacher_name,
            teacher_email: row.teacher_email,
            tests_count: row.tests_count,
            attempts_count: row.attempts_count,
            avg_score: decimal_to_f64(row.avg_score),
            pass_rate,
        }
    }
}
