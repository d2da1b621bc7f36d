use crate::dto::test_dto::{CreateTestPayload, QuestionPayload, UpdateTestPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Identity;
use crate::models::question::{PublicQuestion, Question};
use crate::models::test::{AdminTestSummary, TeacherTestSummary, Test, TestWithTeacher};
use crate::models::user::Role;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const NOT_OWNED: &str = "Test not found or unauthorized";

/// Whether a viewer may open a test with the given class restriction.
/// A restricted test needs staff or a student of that class.
pub fn can_view(
    restriction: Option<Uuid>,
    viewer: Option<Identity>,
    viewer_class: Option<Uuid>,
) -> bool {
    match (restriction, viewer.map(|v| v.role)) {
        (None, _) => true,
        (Some(_), Some(Role::Teacher | Role::Admin)) => true,
        (Some(class_id), Some(Role::Student)) => viewer_class == Some(class_id),
        (Some(_), None) => false,
    }
}

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
}

impl TestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn student_class(&self, viewer: Option<Identity>) -> Result<Option<Uuid>> {
        match viewer {
            Some(identity) if identity.role == Role::Student => {
                let class_id: Option<Option<Uuid>> =
                    sqlx::query_scalar(r#"SELECT class_id FROM users WHERE id = $1"#)
                        .bind(identity.user_id)
                        .fetch_optional(&self.pool)
                        .await?;
                Ok(class_id.flatten())
            }
            _ => Ok(None),
        }
    }

    pub async fn list_tests(&self, viewer: Option<Identity>) -> Result<Vec<Test>> {
        let tests = match viewer.map(|v| (v.user_id, v.role)) {
            Some((student_id, Role::Student)) => {
                let class_id = self.student_class(viewer).await?;
                sqlx::query_as::<_, Test>(
                    r#"
                    SELECT t.* FROM tests t
                    WHERE t.is_active = TRUE
                      AND (t.class_id IS NULL OR t.class_id = $2)
                      AND NOT EXISTS (
                          SELECT 1 FROM test_attempts a
                          WHERE a.test_id = t.id AND a.user_id = $1
                      )
                    ORDER BY t.created_at DESC
                    "#,
                )
                .bind(student_id)
                .bind(class_id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(_) => {
                sqlx::query_as::<_, Test>(
                    r#"SELECT * FROM tests WHERE is_active = TRUE ORDER BY created_at DESC"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Test>(
                    r#"
                    SELECT * FROM tests
                    WHERE is_active = TRUE AND class_id IS NULL
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(tests)
    }

    pub async fn get_test(&self, test_id: Uuid, viewer: Option<Identity>) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        let viewer_class = self.student_class(viewer).await?;
        if !can_view(test.class_id, viewer, viewer_class) {
            return Err(Error::Unauthorized("Unauthorized to view this test".to_string()));
        }
        Ok(test)
    }

    pub async fn get_questions(
        &self,
        test_id: Uuid,
        viewer: Option<Identity>,
    ) -> Result<Vec<PublicQuestion>> {
        self.get_test(test_id, viewer).await?;

        let questions = sqlx::query_as::<_, PublicQuestion>(
            r#"
            SELECT id, test_id, question_text, option_a, option_b, option_c, option_d, order_index
            FROM questions
            WHERE test_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn list_own_tests(&self, teacher_id: Uuid) -> Result<Vec<TeacherTestSummary>> {
        let tests = sqlx::query_as::<_, TeacherTestSummary>(
            r#"
            SELECT t.id, t.title, t.description, t.duration_minutes, t.passing_score,
                   t.calculator_allowed, t.class_id, c.name AS class_name, t.is_active, t.created_at,
                   (SELECT COUNT(*) FROM questions q WHERE q.test_id = t.id) AS question_count,
                   (SELECT COUNT(*) FROM test_attempts a WHERE a.test_id = t.id) AS attempt_count
            FROM tests t
            LEFT JOIN classes c ON c.id = t.class_id
            WHERE t.created_by = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn create_test(&self, teacher_id: Uuid, payload: CreateTestPayload) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let test_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO tests (
                title, description, duration_minutes, passing_score,
                calculator_allowed, class_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(payload.duration_minutes)
        .bind(payload.passing_score)
        .bind(payload.calculator_allowed)
        .bind(payload.class_id)
        .bind(teacher_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_questions(&mut tx, test_id, &payload.questions).await?;
        tx.commit().await?;

        tracing::info!(
            %test_id,
            %teacher_id,
            questions = payload.questions.len(),
            "Test created"
        );
        Ok(test_id)
    }

    pub async fn update_test(
        &self,
        teacher_id: Uuid,
        test_id: Uuid,
        payload: UpdateTestPayload,
    ) -> Result<()> {
        let (set_class, class_id) = match payload.class_id {
            Some(class_id) => (true, class_id),
            None => (false, None),
        };

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE tests
            SET title = $3,
                description = $4,
                duration_minutes = $5,
                passing_score = $6,
                class_id = CASE WHEN $7 THEN $8 ELSE class_id END
            WHERE id = $1 AND created_by = $2
            "#,
        )
        .bind(test_id)
        .bind(teacher_id)
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(payload.duration_minutes)
        .bind(payload.passing_score)
        .bind(set_class)
        .bind(class_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(Error::NotFound(NOT_OWNED.to_string()));
        }

        if let Some(questions) = payload.questions.as_deref() {
            sqlx::query(r#"DELETE FROM questions WHERE test_id = $1"#)
                .bind(test_id)
                .execute(&mut *tx)
                .await?;
            insert_questions(&mut tx, test_id, questions).await?;
        }

        tx.commit().await?;
        tracing::info!(%test_id, %teacher_id, "Test updated");
        Ok(())
    }

    async fn ensure_owned(&self, teacher_id: Uuid, test_id: Uuid) -> Result<()> {
        let owned: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM tests WHERE id = $1 AND created_by = $2)"#,
        )
        .bind(test_id)
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;

        if owned {
            Ok(())
        } else {
            Err(Error::NotFound(NOT_OWNED.to_string()))
        }
    }

    pub async fn get_own_questions(&self, teacher_id: Uuid, test_id: Uuid) -> Result<Vec<Question>> {
        self.ensure_owned(teacher_id, test_id).await?;

        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE test_id = $1 ORDER BY order_index ASC"#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn delete_own_test(&self, teacher_id: Uuid, test_id: Uuid) -> Result<()> {
        let deleted = sqlx::query(r#"DELETE FROM tests WHERE id = $1 AND created_by = $2"#)
            .bind(test_id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(Error::NotFound(NOT_OWNED.to_string()));
        }
        tracing::info!(%test_id, %teacher_id, "Test deleted");
        Ok(())
    }

    pub async fn list_all_tests(&self) -> Result<Vec<AdminTestSummary>> {
        let tests = sqlx::query_as::<_, AdminTestSummary>(
            r#"
            SELECT t.id, t.title, t.description, t.duration_minutes, t.passing_score,
                   t.class_id, t.created_by, u.name AS teacher_name, t.is_active, t.created_at,
                   (SELECT COUNT(*) FROM questions q WHERE q.test_id = t.id) AS question_count,
                   (SELECT COUNT(*) FROM test_attempts a WHERE a.test_id = t.id) AS attempt_count
            FROM tests t
            JOIN users u ON u.id = t.created_by
            ORDER BY t.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn get_with_teacher(&self, test_id: Uuid) -> Result<TestWithTeacher> {
        sqlx::query_as::<_, TestWithTeacher>(
            r#"
            SELECT t.*, u.name AS teacher_name
            FROM tests t
            JOIN users u ON u.id = t.created_by
            WHERE t.id = $1
            "#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<()> {
        let deleted = sqlx::query(r#"DELETE FROM tests WHERE id = $1"#)
            .bind(test_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(Error::NotFound("Test not found".to_string()));
        }
        tracing::info!(%test_id, "Test deleted by admin");
        Ok(())
    }
}

/// Inserts questions with 1-based order indexes following their position.
async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    test_id: Uuid,
    questions: &[QuestionPayload],
) -> Result<()> {
    for (position, question) in questions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO questions (
                test_id, question_text, option_a, option_b, option_c, option_d,
                correct_answer, points, order_index
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(test_id)
        .bind(question.question_text.trim())
        .bind(&question.option_a)
        .bind(&question.option_b)
        .bind(&question.option_c)
        .bind(&question.option_d)
        .bind(&question.correct_answer)
        .bind(question.points)
        .bind(position as i32 + 1)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
