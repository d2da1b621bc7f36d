use crate::dto::auth_dto::{LoginRequest, RegisterRequest};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::services::user_service::{NewUser, UserService};
use crate::utils::crypto::verify_password;
use crate::utils::token::issue_token;

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(users: UserService, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl_hours,
        }
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_hours * 3600
    }

    /// Self-service sign-up; only students and teachers may register.
    pub async fn register(&self, req: RegisterRequest) -> Result<(User, String)> {
        let role: Role = req
            .role
            .parse()
            .map_err(|_| Error::BadRequest("Invalid role".to_string()))?;
        if role == Role::Admin {
            return Err(Error::BadRequest("Invalid role".to_string()));
        }

        let user = self
            .users
            .create_user(NewUser {
                email: req.email,
                password: req.password,
                name: req.name,
                role,
                class_id: req.class_id,
            })
            .await?;
        let token = issue_token(&user, &self.jwt_secret, self.token_ttl_hours)?;
        Ok((user, token))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<(User, String)> {
        let invalid = || Error::Unauthorized("Invalid email or password".to_string());

        let user = self.users.get_by_email(&req.email).await?.ok_or_else(invalid)?;
        if !verify_password(&req.password, &user.password_hash) {
            tracing::info!(email = %req.email, "Login rejected");
            return Err(invalid());
        }

        let token = issue_token(&user, &self.jwt_secret, self.token_ttl_hours)?;
        Ok((user, token))
    }
}
