pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use crate::services::{
    auth_service::AuthService,
    class_service::ClassService,
    result_service::ResultService,
    submission_service::{PgSubmissionStore, SubmissionService},
    test_service::TestService,
    user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub class_service: ClassService,
    pub test_service: TestService,
    pub submission_service: SubmissionService<PgSubmissionStore>,
    pub result_service: ResultService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(
            user_service.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_hours,
        );
        let class_service = ClassService::new(pool.clone());
        let test_service = TestService::new(pool.clone());
        let submission_service = SubmissionService::new(PgSubmissionStore::new(pool.clone()));
        let result_service = ResultService::new(pool.clone());

        Self {
            pool,
            auth_service,
            user_service,
            class_service,
            test_service,
            submission_service,
            result_service,
        }
    }
}
