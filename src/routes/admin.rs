use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{ClassNameRequest, CreateUserRequest, UpdateUserRequest};
use crate::dto::auth_dto::UserSummary;
use crate::error::Error;
use crate::middleware::auth::Claims;
use crate::models::user::Role;
use crate::routes::{IdPath, JsonBody};
use crate::services::user_service::NewUser;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> crate::error::Result<impl IntoResponse> {
    let users = state.user_service.list_users().await?;
    Ok(Json(json!({ "users": users })))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let role: Role = payload
        .role
        .parse()
        .map_err(|_| Error::BadRequest("Invalid role".to_string()))?;

    let user = state
        .user_service
        .create_user(NewUser {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            role,
            class_id: payload.class_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": UserSummary::from(&user) })),
    ))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    state.user_service.update_user(id, payload).await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    state.user_service.delete_user(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Open to any signed-in user so registration forms can offer classes.
#[axum::debug_handler]
pub async fn list_classes(State(state): State<AppState>) -> crate::error::Result<impl IntoResponse> {
    let classes = state.class_service.list_classes().await?;
    Ok(Json(json!({ "classes": classes })))
}

#[axum::debug_handler]
pub async fn create_class(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<ClassNameRequest>,
) -> crate::error::Result<impl IntoResponse> {
    claims.require(&[Role::Admin])?;
    payload
        .validate()
        .map_err(|_| Error::BadRequest("Name is required".to_string()))?;
    let class = state.class_service.create_class(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(json!({ "class": class }))))
}

#[axum::debug_handler]
pub async fn rename_class(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<ClassNameRequest>,
) -> crate::error::Result<impl IntoResponse> {
    claims.require(&[Role::Admin])?;
    payload
        .validate()
        .map_err(|_| Error::BadRequest("Name is required".to_string()))?;
    let class = state.class_service.rename_class(id, &payload.name).await?;
    Ok(Json(json!({ "class": class })))
}

#[axum::debug_handler]
pub async fn delete_class(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    claims.require(&[Role::Admin])?;
    state.class_service.delete_class(id).await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn list_tests(State(state): State<AppState>) -> crate::error::Result<impl IntoResponse> {
    let tests = state.test_service.list_all_tests().await?;
    Ok(Json(json!({ "tests": tests })))
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let test = state.test_service.get_with_teacher(id).await?;
    Ok(Json(json!({ "test": test })))
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    state.test_service.delete_test(id).await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn list_attempts(State(state): State<AppState>) -> crate::error::Result<impl IntoResponse> {
    let attempts = state.result_service.recent_attempts().await?;
    Ok(Json(json!({ "attempts": attempts })))
}

#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>) -> crate::error::Result<impl IntoResponse> {
    let stats = state.result_service.admin_stats().await?;
    Ok(Json(json!({ "stats": stats })))
}

#[axum::debug_handler]
pub async fn teacher_stats(State(state): State<AppState>) -> crate::error::Result<impl IntoResponse> {
    let teachers = state.result_service.teacher_stats().await?;
    Ok(Json(json!({ "teachers": teachers })))
}
