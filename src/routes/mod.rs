pub mod admin;
pub mod auth;
pub mod health;
pub mod teacher;

use axum::{
    extract::{FromRequest, FromRequestParts},
    middleware::from_fn,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::Error;
use crate::middleware::auth::{require_admin, require_authenticated, require_teacher, resolve_identity};
use crate::AppState;

/// `axum::Json` whose rejections render as 400 `{"error": ...}` bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Path` that answers 404 `{"error": ...}` for ids that do
/// not parse.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct IdPath<T>(pub T);

pub fn build_router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/tests", get(tests::list_tests))
        .route("/api/tests/:id", get(tests::get_test))
        .route("/api/tests/:id/questions", get(tests::get_questions))
        .route("/api/tests/:id/submit", post(tests::submit_test))
        .route_layer(from_fn(resolve_identity));

    let member_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/admin/classes",
            get(admin::list_classes).post(admin::create_class),
        )
        .route(
            "/api/admin/classes/:id",
            patch(admin::rename_class).delete(admin::delete_class),
        )
        .route_layer(from_fn(require_authenticated));

    let teacher_api = Router::new()
        .route(
            "/api/teacher/tests",
            get(teacher::list_tests).post(teacher::create_test),
        )
        .route(
            "/api/teacher/tests/:id",
            put(teacher::update_test).delete(teacher::delete_test),
        )
        .route(
            "/api/teacher/tests/:id/questions",
            get(teacher::get_questions).put(teacher::replace_questions),
        )
        .route("/api/teacher/results", get(teacher::list_results))
        .route(
            "/api/teacher/results/test/:test_id",
            get(teacher::test_results),
        )
        .route(
            "/api/teacher/results/:attempt_id",
            get(teacher::attempt_detail),
        )
        .route_layer(from_fn(require_teacher));

    let admin_api = Router::new()
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/api/admin/users/:id",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/tests", get(admin::list_tests))
        .route(
            "/api/admin/tests/:id",
            get(admin::get_test).delete(admin::delete_test),
        )
        .route("/api/admin/attempts", get(admin::list_attempts))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/teachers/stats", get(admin::teacher_stats))
        .route_layer(from_fn(require_admin));

    public_api
        .merge(member_api)
        .merge(teacher_api)
        .merge(admin_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
