use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::CustomerAuth;
use crate::db;
use crate::error::ApiError;
use crate::models::booking::{Booking, BookingCreate};
use crate::services::pricing;

/// POST /api/bookings — create a pending booking.
///
/// The amount is always recomputed here; clients only show an estimate.
pub async fn create_booking(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Json(body): Json<BookingCreate>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    body.validate()?;

    if db::addresses::get_for_user(&state.db, body.address_id, user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Address"));
    }

    let amount = pricing::quote(body.package_type, &body.add_ons());
    let booking = db::bookings::create(&state.db, user_id, &body, amount).await?;

    metrics::counter!("bookings_created_total", "package" => booking.package_type.as_ref().to_string())
        .increment(1);
    tracing::info!(
        booking_id = %booking.id,
        user_id = %user_id,
        amount = %amount,
        "Booking created"
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings — the caller's bookings, newest first.
pub async fn list_bookings(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(db::bookings::list_for_customer(&state.db, user_id).await?))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    db::bookings::get_for_customer(&state.db, id, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Booking"))
}
