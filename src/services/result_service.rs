use crate::dto::admin_dto::{decimal_to_f64, AdminStats, TeacherStats};
use crate::error::{Error, Result};
use crate::models::answer::ReviewedAnswer;
use crate::models::result::{RecentAttempt, TeacherResult, TeacherStatsRow, TestResult};
use crate::models::test_attempt::AttemptDetail;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct AttemptReview {
    pub attempt: AttemptDetail,
    pub answers: Vec<ReviewedAnswer>,
}

#[derive(Debug, FromRow)]
struct StatsRow {
    total_users: i64,
    total_students: i64,
    total_teachers: i64,
    total_tests: i64,
    total_attempts: i64,
    average_score: Option<Decimal>,
}

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn teacher_results(&self, teacher_id: Uuid) -> Result<Vec<TeacherResult>> {
        let rows = sqlx::query_as::<_, TeacherResult>(
            r#"
            SELECT a.id AS attempt_id, a.score, a.passed, a.completed_at,
                   u.id AS student_id, u.name AS student_name, u.email AS student_email,
                   c.id AS class_id, c.name AS class_name,
                   t.id AS test_id, t.title AS test_title
            FROM test_attempts a
            JOIN tests t ON t.id = a.test_id
            JOIN users u ON u.id = a.user_id
            LEFT JOIN classes c ON c.id = u.class_id
            WHERE t.created_by = $1
            ORDER BY a.completed_at DESC
            LIMIT 200
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn test_results(&self, teacher_id: Uuid, test_id: Uuid) -> Result<Vec<TestResult>> {
        let owned: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM tests WHERE id = $1 AND created_by = $2)"#,
        )
        .bind(test_id)
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;
        if !owned {
            return Err(Error::NotFound("Test not found or unauthorized".to_string()));
        }

        let rows = sqlx::query_as::<_, TestResult>(
            r#"
            SELECT a.id AS attempt_id, a.score, a.passed, a.completed_at,
                   u.id AS student_id, u.name AS student_name, u.email AS student_email
            FROM test_attempts a
            JOIN users u ON u.id = a.user_id
            WHERE a.test_id = $1
            ORDER BY a.completed_at DESC
            LIMIT 100
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Only attempts on the teacher's own tests are visible.
    pub async fn attempt_review(&self, teacher_id: Uuid, attempt_id: Uuid) -> Result<AttemptReview> {
        let attempt = sqlx::query_as::<_, AttemptDetail>(
            r#"
            SELECT a.*, u.name AS student_name, t.title AS test_title
            FROM test_attempts a
            JOIN users u ON u.id = a.user_id
            JOIN tests t ON t.id = a.test_id
            WHERE a.id = $1 AND t.created_by = $2
            "#,
        )
        .bind(attempt_id)
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Attempt not found".to_string()))?;

        let answers = sqlx::query_as::<_, ReviewedAnswer>(
            r#"
            SELECT ans.*, q.question_text, q.option_a, q.option_b, q.option_c, q.option_d,
                   q.correct_answer
            FROM answers ans
            JOIN questions q ON q.id = ans.question_id
            WHERE ans.attempt_id = $1
            ORDER BY q.order_index ASC
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AttemptReview { attempt, answers })
    }

    pub async fn recent_attempts(&self) -> Result<Vec<RecentAttempt>> {
        let rows = sqlx::query_as::<_, RecentAttempt>(
            r#"
            SELECT a.id, a.score, a.passed, a.completed_at,
                   u.name AS student_name, t.title AS test_title
            FROM test_attempts a
            JOIN users u ON u.id = a.user_id
            JOIN tests t ON t.id = a.test_id
            ORDER BY a.completed_at DESC
            LIMIT 100
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn admin_stats(&self) -> Result<AdminStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE role = 'student') AS total_students,
                (SELECT COUNT(*) FROM users WHERE role = 'teacher') AS total_teachers,
                (SELECT COUNT(*) FROM tests) AS total_tests,
                (SELECT COUNT(*) FROM test_attempts) AS total_attempts,
                (SELECT AVG(score) FROM test_attempts) AS average_score
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_users: row.total_users,
            total_students: row.total_students,
            total_teachers: row.total_teachers,
            total_tests: row.total_tests,
            total_attempts: row.total_attempts,
            average_score: decimal_to_f64(row.average_score),
        })
    }

    pub async fn teacher_stats(&self) -> Result<Vec<TeacherStats>> {
        let rows = sqlx::query_as::<_, TeacherStatsRow>(
            r#"
            SELECT u.id AS teacher_id, u.name AS teacher_name, u.email AS teacher_email,
                   COUNT(DISTINCT t.id) AS tests_count,
                   COUNT(a.id) AS attempts_count,
                   AVG(a.score) AS avg_score,
                   COUNT(a.id) FILTER (WHERE a.passed) AS passed_count
            FROM users u
            LEFT JOIN tests t ON t.created_by = u.id
            LEFT JOIN test_attempts a ON a.test_id = t.id
            WHERE u.role = 'teacher'
            GROUP BY u.id, u.name, u.email
            ORDER BY tests_count DESC, attempts_count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TeacherStats::from).collect())
    }
}
