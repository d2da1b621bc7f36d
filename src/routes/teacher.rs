use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::test_dto::{CreateTestPayload, CreateTestResponse, UpdateTestPayload};
use crate::error::Error;
use crate::middleware::auth::Claims;
use crate::models::user::Role;
use crate::routes::{IdPath, JsonBody};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    let tests = state.test_service.list_own_tests(teacher.user_id).await?;
    Ok(Json(json!({ "tests": tests })))
}

#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<CreateTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    payload.validate()?;
    let test_id = state.test_service.create_test(teacher.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(CreateTestResponse { test_id })))
}

#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<UpdateTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    payload.validate()?;
    state
        .test_service
        .update_test(teacher.user_id, id, payload)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    state.test_service.delete_own_test(teacher.user_id, id).await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_questions(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    let questions = state
        .test_service
        .get_own_questions(teacher.user_id, id)
        .await?;
    Ok(Json(json!({ "questions": questions })))
}

#[axum::debug_handler]
pub async fn replace_questions(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(payload): JsonBody<UpdateTestPayload>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    if payload.questions.is_none() {
        return Err(Error::BadRequest(
            "At least one question is required".to_string(),
        ));
    }
    payload.validate()?;
    state
        .test_service
        .update_test(teacher.user_id, id, payload)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    let results = state.result_service.teacher_results(teacher.user_id).await?;
    Ok(Json(json!({ "results": results })))
}

#[axum::debug_handler]
pub async fn test_results(
    State(state): State<AppState>,
    IdPath(test_id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    let attempts = state
        .result_service
        .test_results(teacher.user_id, test_id)
        .await?;
    Ok(Json(json!({ "attempts": attempts })))
}

#[axum::debug_handler]
pub async fn attempt_detail(
    State(state): State<AppState>,
    IdPath(attempt_id): IdPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let teacher = claims.require(&[Role::Teacher])?;
    let review = state
        .result_service
        .attempt_review(teacher.user_id, attempt_id)
        .await?;
    Ok(Json(review))
}
