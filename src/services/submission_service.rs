use crate::error::{Error, Result};
use crate::middleware::auth::Identity;
use crate::models::question::AnswerKey;
use crate::models::user::Role;
use crate::services::grading_service::{GradedAnswer, GradingService};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

/// Test metadata the evaluator checks eligibility and the verdict against.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TestGate {
    pub id: Uuid,
    pub passing_score: i32,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub student_id: Uuid,
    pub test_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub passed: bool,
    pub time_taken_seconds: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub answers: Vec<GradedAnswer>,
}

#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub answers: HashMap<String, serde_json::Value>,
    pub time_taken_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub attempt_id: Uuid,
    pub score: i32,
    pub passed: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_test(&self, test_id: Uuid) -> Result<Option<TestGate>>;

    /// `None` both for a student without a class and for an unknown user.
    async fn student_class(&self, student_id: Uuid) -> Result<Option<Uuid>>;

    async fn has_attempt(&self, student_id: Uuid, test_id: Uuid) -> Result<bool>;

    async fn answer_key(&self, test_id: Uuid) -> Result<Vec<AnswerKey>>;

    /// Writes the attempt and all of its answers atomically. A second attempt
    /// for the same (student, test) pair fails with `Error::Conflict`.
    async fn record_attempt(&self, attempt: NewAttempt) -> Result<Uuid>;
}

#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn find_test(&self, test_id: Uuid) -> Result<Option<TestGate>> {
        let test = sqlx::query_as::<_, TestGate>(
            r#"SELECT id, passing_score, class_id FROM tests WHERE id = $1"#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(test)
    }

    async fn student_class(&self, student_id: Uuid) -> Result<Option<Uuid>> {
        let class_id: Option<Option<Uuid>> =
            sqlx::query_scalar(r#"SELECT class_id FROM users WHERE id = $1"#)
                .bind(student_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(class_id.flatten())
    }

    async fn has_attempt(&self, student_id: Uuid, test_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM test_attempts WHERE user_id = $1 AND test_id = $2)"#,
        )
        .bind(student_id)
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn answer_key(&self, test_id: Uuid) -> Result<Vec<AnswerKey>> {
        let key = sqlx::query_as::<_, AnswerKey>(
            r#"SELECT id, correct_answer FROM questions WHERE test_id = $1 ORDER BY order_index"#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(key)
    }

    async fn record_attempt(&self, attempt: NewAttempt) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO test_attempts (
                user_id, test_id, score, total_questions, time_taken_seconds, passed,
                started_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(attempt.student_id)
        .bind(attempt.test_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.time_taken_seconds)
        .bind(attempt.passed)
        .bind(attempt.started_at)
        .bind(attempt.completed_at)
        .fetch_one(&mut *tx)
        .await;

        let attempt_id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(Error::Conflict("Already attempted this test".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        for answer in &attempt.answers {
            sqlx::query(
                r#"
                INSERT INTO answers (attempt_id, question_id, selected_answer, is_correct)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(attempt_id)
            .bind(answer.question_id)
            .bind(answer.selected_answer.as_deref())
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(attempt_id)
    }
}

/// Scores a student's answer sheet and records the attempt.
#[derive(Clone)]
pub struct SubmissionService<S> {
    store: S,
}

/// Only a student identity may submit.
pub fn student_id(identity: Option<Identity>) -> Result<Uuid> {
    match identity {
        Some(Identity {
            user_id,
            role: Role::Student,
        }) => Ok(user_id),
        _ => Err(Error::Unauthorized("Unauthorized".to_string())),
    }
}

impl<S: SubmissionStore> SubmissionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        identity: Option<Identity>,
        test_id: Uuid,
        submission: Submission,
    ) -> Result<SubmissionOutcome> {
        let student_id = student_id(identity)?;

        let test = self
            .store
            .find_test(test_id)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        if let Some(required_class) = test.class_id {
            let student_class = self.store.student_class(student_id).await?;
            if student_class != Some(required_class) {
                tracing::info!(%student_id, %test_id, "Submission rejected: class mismatch");
                return Err(Error::Unauthorized(
                    "Unauthorized to submit this test".to_string(),
                ));
            }
        }

        if self.store.has_attempt(student_id, test_id).await? {
            return Err(Error::Conflict("Already attempted this test".to_string()));
        }

        let key = self.store.answer_key(test_id).await?;
        let grade = GradingService::grade(&key, &submission.answers);
        let score = grade.score().ok_or_else(|| {
            Error::Config(format!("Test {} has no questions and cannot be scored", test_id))
        })?;
        let passed = GradingService::passed(score, test.passing_score);

        let time_taken_seconds = submission.time_taken_seconds.unwrap_or(0).max(0);
        let completed_at = Utc::now();
        let started_at = completed_at - Duration::seconds(time_taken_seconds as i64);

        let attempt_id = self
            .store
            .record_attempt(NewAttempt {
                student_id,
                test_id,
                score,
                total_questions: grade.total_questions as i32,
                passed,
                time_taken_seconds,
                started_at,
                completed_at,
                answers: grade.answers,
            })
            .await?;

        tracing::info!(
            %attempt_id,
            %student_id,
            %test_id,
            score,
            passed,
            correct = grade.correct_count,
            total = grade.total_questions,
            "Test submitted"
        );

        Ok(SubmissionOutcome {
            attempt_id,
            score,
            passed,
        })
    }
}
