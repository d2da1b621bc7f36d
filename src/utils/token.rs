use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::user::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub fn issue_token(user: &User, secret: &str, ttl_hours: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
        exp: exp.max(0) as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "student@test.com".into(),
            password_hash: String::new(),
            name: "Default Student".into(),
            role: role.into(),
            class_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let u = user("student");
        let token = issue_token(&u, "secret", 24).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, u.id.to_string());
        assert_eq!(claims.role, "student");
        assert_eq!(claims.email, "student@test.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&user("teacher"), "secret", 24).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(&user("admin"), "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}
