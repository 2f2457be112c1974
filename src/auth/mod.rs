//! Bearer tokens and password hashing.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

pub mod extract;

pub use extract::{AdminAuth, AuthUser, CustomerAuth, TechnicianAuth};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// HS256 signing keys plus token lifetime.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl AuthKeys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// False for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_with_role() {
        let keys = AuthKeys::new("test-secret", 1);
        let id = Uuid::new_v4();
        let token = keys.issue(id, Role::FieldTeam).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::FieldTeam);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = AuthKeys::new("one", 1).issue(Uuid::new_v4(), Role::Admin).unwrap();
        assert!(matches!(
            AuthKeys::new("two", 1).verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        let keys = AuthKeys::new("secret", -2);
        let token = keys.issue(Uuid::new_v4(), Role::Customer).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("tank-clean-42").unwrap();
        assert!(verify_password("tank-clean-42", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("tank-clean-42", "not-a-hash"));
    }
}
