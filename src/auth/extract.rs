use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use super::AuthError;
use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::user::Role;

/// Any signed-in caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = state.auth.verify(token)?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

async fn require_role(parts: &mut Parts, state: &AppState, role: Role) -> Result<Uuid, ApiError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role == role {
        Ok(user.id)
    } else {
        Err(ApiError::Forbidden(format!("{role} access required")))
    }
}

/// A signed-in customer.
#[derive(Debug, Clone, Copy)]
pub struct CustomerAuth(pub Uuid);

/// A signed-in field technician.
#[derive(Debug, Clone, Copy)]
pub struct TechnicianAuth(pub Uuid);

/// A signed-in admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth(pub Uuid);

impl FromRequestParts<AppState> for CustomerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Customer).await.map(Self)
    }
}

impl FromRequestParts<AppState> for TechnicianAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::FieldTeam).await.map(Self)
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin).await.map(Self)
    }
}
