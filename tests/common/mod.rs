#![allow(dead_code)]

use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use cbt_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    models::user::User,
    routes::build_router,
    utils::{crypto::hash_password, token::issue_token},
    AppState,
};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

/// Router plus pool against `DATABASE_URL`; `None` when no database is configured.
pub async fn setup() -> Option<(Router, PgPool)> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    let _ = init_config();

    let pool = create_pool().await.expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    Some((build_router(AppState::new(pool.clone())), pool))
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

/// Inserts a user and returns it with a bearer token.
pub async fn seed_user(pool: &PgPool, role: &str, class_id: Option<Uuid>) -> (User, String) {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, name, role, class_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(unique_email(role))
    .bind(hash_password("password123").expect("hash"))
    .bind(format!("Test {}", role))
    .bind(role)
    .bind(class_id)
    .fetch_one(pool)
    .await
    .expect("seed user");

    let token = issue_token(&user, &get_config().jwt_secret, 1).expect("token");
    (user, token)
}

pub async fn seed_class(pool: &PgPool) -> Uuid {
    sqlx::query_scalar(r#"INSERT INTO classes (name) VALUES ($1) RETURNING id"#)
        .bind(format!("Class {}", Uuid::new_v4().simple()))
        .fetch_one(pool)
        .await
        .expect("seed class")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    send_raw(app, method, uri, token, body.map(|b| b.to_string())).await
}

/// Like `send`, but the body goes out verbatim as `application/json`.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

/// Creates a test through the teacher API; one question per correct letter.
pub async fn create_test(
    app: &Router,
    teacher_token: &str,
    letters: &[&str],
    passing_score: i32,
    class_id: Option<Uuid>,
) -> Uuid {
    let questions: Vec<JsonValue> = letters
        .iter()
        .enumerate()
        .map(|(i, letter)| {
            serde_json::json!({
                "question_text": format!("Question {}", i + 1),
                "option_a": "one",
                "option_b": "two",
                "option_c": "three",
                "option_d": "four",
                "correct_answer": letter,
            })
        })
        .collect();

    let (status, body) = send(
        app,
        "POST",
        "/api/teacher/tests",
        Some(teacher_token),
        Some(serde_json::json!({
            "title": "Algebra quiz",
            "description": "Linear equations",
            "duration_minutes": 30,
            "passing_score": passing_score,
            "class_id": class_id,
            "questions": questions,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create test: {}", body);
    body["test_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("test id")
}

/// Question ids in order, via the teacher view.
pub async fn question_ids(app: &Router, teacher_token: &str, test_id: Uuid) -> Vec<String> {
    let (status, body) = send(
        app,
        "GET",
        &format!("/api/teacher/tests/{}/questions", test_id),
        Some(teacher_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .map(|q| q["id"].as_str().expect("id").to_string())
        .collect()
}
