use crate::dto::admin_dto::UpdateUserRequest;
use crate::error::{Error, Result};
use crate::models::user::{Role, User, UserWithClass};
use crate::utils::crypto::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub class_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        if self.get_by_email(&new_user.email).await?.is_some() {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&new_user.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, role, class_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new_user.email)
        .bind(password_hash)
        .bind(new_user.name.trim())
        .bind(new_user.role.as_str())
        .bind(new_user.class_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("User already exists".to_string()),
            other => other,
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<UserWithClass>> {
        let users = sqlx::query_as::<_, UserWithClass>(
            r#"
            SELECT u.id, u.email, u.name, u.role, u.created_at, c.id AS class_id, c.name AS class_name
            FROM users u
            LEFT JOIN classes c ON u.class_id = c.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn update_user(&self, user_id: Uuid, req: UpdateUserRequest) -> Result<User> {
        let target = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let email = req.email.filter(|e| !e.is_empty());
        if let Some(email) = email.as_deref() {
            if email != target.email {
                if let Some(existing) = self.get_by_email(email).await? {
                    if existing.id != user_id {
                        return Err(Error::Conflict("Email already in use".to_string()));
                    }
                }
            }
        }

        let role = req.role.filter(|r| !r.is_empty());
        if target.role() == Some(Role::Admin) {
            if let Some(role) = role.as_deref() {
                if role != Role::Admin.as_str() {
                    let admins: i64 =
                        sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE role = 'admin'"#)
                            .fetch_one(&self.pool)
                            .await?;
                    if admins <= 1 {
                        return Err(Error::Forbidden("Cannot remove last admin".to_string()));
                    }
                }
            }
        }

        let password_hash = match req.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };
        let name = req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let (set_class, class_id) = match req.class_id {
            Some(class_id) => (true, class_id),
            None => (false, None),
        };

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                name = COALESCE($3, name),
                role = COALESCE($4, role),
                password_hash = COALESCE($5, password_hash),
                class_id = CASE WHEN $6 THEN $7 ELSE class_id END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(name)
        .bind(role)
        .bind(password_hash)
        .bind(set_class)
        .bind(class_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("Email already in use".to_string()),
            other => other,
        })?;

        Ok(updated)
    }

    /// Attempts, answers and authored tests go with the user via cascades.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let target = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        if target.role() == Some(Role::Admin) {
            return Err(Error::Forbidden("Cannot delete admin users".to_string()));
        }

        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(%user_id, "User deleted");
        Ok(())
    }
}
