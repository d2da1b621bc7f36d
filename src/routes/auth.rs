use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest, UserSummary};
use crate::middleware::auth::{clear_session_cookie, session_cookie, Claims};
use crate::routes::JsonBody;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let (user, token) = state.auth_service.register(payload).await?;

    let cookie = session_cookie(
        &token,
        state.auth_service.token_ttl_seconds(),
        crate::config::get_config().cookie_secure,
    );
    let body = AuthResponse {
        user: UserSummary::from(&user),
        token,
    };
    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(body)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> crate::error::Result<impl IntoResponse> {
    payload.validate()?;
    let (user, token) = state.auth_service.login(payload).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let cookie = session_cookie(
        &token,
        state.auth_service.token_ttl_seconds(),
        crate::config::get_config().cookie_secure,
    );
    let body = AuthResponse {
        user: UserSummary::from(&user),
        token,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

#[axum::debug_handler]
pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    )
}

#[axum::debug_handler]
pub async fn me(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(json!({
        "user": {
            "id": claims.sub,
            "email": claims.email,
            "name": claims.name,
            "role": claims.role,
        }
    }))
}
