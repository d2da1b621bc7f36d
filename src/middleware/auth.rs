use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::Role;
use crate::utils::token::decode_token;

pub const AUTH_COOKIE: &str = "auth-token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

/// Caller resolved from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Claims {
    pub fn identity(&self) -> Option<Identity> {
        let user_id = Uuid::parse_str(&self.sub).ok()?;
        let role = self.role.parse().ok()?;
        Some(Identity { user_id, role })
    }

    pub fn require(&self, allowed: &[Role]) -> Result<Identity> {
        match self.identity() {
            Some(identity) if allowed.contains(&identity.role) => Ok(identity),
            _ => Err(Error::Unauthorized("Unauthorized".to_string())),
        }
    }
}

/// Bearer header first, then the `auth-token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value)
}

pub fn resolve(headers: &HeaderMap) -> Option<Claims> {
    let token = extract_token(headers)?;
    let config = crate::config::get_config();
    decode_token(token, &config.jwt_secret).ok()
}

/// Attaches `Claims` when the request carries a valid token; never rejects.
pub async fn resolve_identity(mut req: Request, next: Next) -> Response {
    if let Some(claims) = resolve(req.headers()) {
        req.extensions_mut().insert(claims);
    }
    next.run(req).await
}

pub async fn require_roles(mut req: Request, next: Next, allowed: &[Role]) -> Response {
    let Some(claims) = resolve(req.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response();
    };

    if !allowed.is_empty() && claims.require(allowed).is_err() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

pub async fn require_authenticated(req: Request, next: Next) -> Response {
    require_roles(req, next, &[]).await
}

pub async fn require_teacher(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Teacher]).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Admin]).await
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", AUTH_COOKIE)
}
