pub mod auth_service;
pub mod class_service;
pub mod grading_service;
pub mod result_service;
pub mod submission_service;
pub mod test_service;
pub mod user_service;
