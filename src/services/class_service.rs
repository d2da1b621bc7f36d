use crate::error::{Error, Result};
use crate::models::class::Class;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ClassService {
    pool: PgPool,
}

impl ClassService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_classes(&self) -> Result<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(r#"SELECT * FROM classes ORDER BY name ASC"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    pub async fn create_class(&self, name: &str) -> Result<Class> {
        let class = sqlx::query_as::<_, Class>(
            r#"INSERT INTO classes (name) VALUES ($1) RETURNING *"#,
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(class)
    }

    pub async fn rename_class(&self, id: Uuid, name: &str) -> Result<Class> {
        let class = sqlx::query_as::<_, Class>(
            r#"UPDATE classes SET name = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Class not found".to_string()))?;
        Ok(class)
    }

    /// Unassigns students and deactivates tests restricted to the class.
    /// Deactivation precedes dropping the restriction so no test turns public.
    pub async fn delete_class(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"UPDATE users SET class_id = NULL WHERE class_id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deactivated = sqlx::query(
            r#"UPDATE tests SET is_active = FALSE, class_id = NULL WHERE class_id = $1"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let deleted = sqlx::query(r#"DELETE FROM classes WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(Error::NotFound("Class not found".to_string()));
        }

        tx.commit().await?;
        tracing::info!(class_id = %id, deactivated_tests = deactivated, "Class deleted");
        Ok(())
    }
}
