use cbt_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    telemetry::init_tracing,
    utils::crypto::hash_password,
};
use tracing::info;
use uuid::Uuid;

const DEMO_USERS: [(&str, &str, &str, &str); 3] = [
    ("student@test.com", "student123", "Default Student", "student"),
    ("teacher@test.com", "teacher123", "Default Teacher", "teacher"),
    ("admin@test.com", "admin123", "Default Admin", "admin"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    init_tracing(get_config())?;

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let existing: Option<Uuid> =
        sqlx::query_scalar(r#"SELECT id FROM classes ORDER BY created_at ASC LIMIT 1"#)
            .fetch_optional(&pool)
            .await?;
    let class_id = match existing {
        Some(id) => id,
        None => {
            let id: Uuid = sqlx::query_scalar(
                r#"INSERT INTO classes (name) VALUES ('Default Class') RETURNING id"#,
            )
            .fetch_one(&pool)
            .await?;
            info!(class_id = %id, "Created Default Class");
            id
        }
    };

    for (email, password, name, role) in DEMO_USERS {
        let password_hash = hash_password(password)?;
        sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, role, class_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                name = EXCLUDED.name,
                role = EXCLUDED.role,
                class_id = EXCLUDED.class_id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(class_id)
        .execute(&pool)
        .await?;
        info!(%email, %role, "Demo account ready with password {}", password);
    }

    Ok(())
}
