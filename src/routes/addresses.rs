use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::CustomerAuth;
use crate::db;
use crate::error::ApiError;
use crate::models::address::{Address, AddressInput};
use crate::models::MessageResponse;

/// GET /api/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(db::addresses::list_for_user(&state.db, user_id).await?))
}

/// POST /api/addresses
pub async fn create_address(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Json(body): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    body.validate()?;
    let address = db::addresses::create(&state.db, user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// PUT /api/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<AddressInput>,
) -> Result<Json<Address>, ApiError> {
    body.validate()?;
    db::addresses::update(&state.db, id, user_id, &body)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Address"))
}

/// DELETE /api/addresses/{id}
pub async fn delete_address(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !db::addresses::delete(&state.db, id, user_id).await? {
        return Err(ApiError::not_found("Address"));
    }
    Ok(Json(MessageResponse::new("Address deleted successfully")))
}
