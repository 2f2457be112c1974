use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{hash_password, verify_password, AdminAuth, AuthError};
use crate::db;
use crate::error::ApiError;
use crate::models::address::Address;
use crate::models::booking::{
    AdminBookingView, AdminDashboardStats, AssignTechnician, Booking, Reschedule, StatusChange,
};
use crate::models::user::{
    AdminUser, AuthResponse, Customer, CustomerSummary, FieldTechnician, LoginRequest,
    RegisterAdmin, Role, SessionUser, TechnicianSummary,
};
use crate::models::MessageResponse;
use crate::services::search::{self, BookingFilter, SearchQuery};

/// Upper bound on rows scanned by the admin booking list.
const BOOKING_SCAN_LIMIT: i64 = 1000;

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    body.validate()?;

    let admin = db::users::find_admin_by_email(&state.db, &body.email)
        .await?
        .filter(|a| verify_password(&body.password, &a.password_hash))
        .ok_or(AuthError::InvalidCredentials)?;

    let token = state.auth.issue(admin.id, Role::Admin)?;
    Ok(Json(AuthResponse {
        token,
        user: SessionUser::from(&admin),
    }))
}

/// POST /api/admin/register — only an existing admin can add another.
pub async fn register(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Json(body): Json<RegisterAdmin>,
) -> Result<(StatusCode, Json<AdminUser>), ApiError> {
    body.validate()?;

    if db::users::find_admin_by_email(&state.db, &body.email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)?;
    let admin = db::users::create_admin(
        &state.db,
        &body.email,
        body.name.trim(),
        body.title.trim(),
        &password_hash,
    )
    .await?;

    tracing::info!(admin_id = %admin.id, registered_by = %admin_id, "Admin registered");
    Ok((StatusCode::CREATED, Json(admin)))
}

/// GET /api/admin/me
pub async fn me(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
) -> Result<Json<AdminUser>, ApiError> {
    db::users::get_admin(&state.db, admin_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Admin"))
}

/// GET /api/admin/dashboard-stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
) -> Result<Json<AdminDashboardStats>, ApiError> {
    Ok(Json(db::stats::admin_dashboard(&state.db).await?))
}

/// Attach customer, address and technician summaries to each booking.
async fn enrich(
    state: &AppState,
    bookings: Vec<Booking>,
) -> Result<Vec<AdminBookingView>, ApiError> {
    let customers: HashMap<Uuid, CustomerSummary> = db::users::list_customers(&state.db)
        .await?
        .iter()
        .map(|c| (c.id, CustomerSummary::from(c)))
        .collect();
    let technicians: HashMap<Uuid, TechnicianSummary> = db::users::list_technicians(&state.db)
        .await?
        .iter()
        .map(|t| (t.id, TechnicianSummary::from(t)))
        .collect();

    let address_ids: Vec<Uuid> = bookings.iter().map(|b| b.address_id).collect();
    let addresses: HashMap<Uuid, Address> = db::addresses::get_many(&state.db, &address_ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(bookings
        .into_iter()
        .map(|booking| AdminBookingView {
            customer: customers.get(&booking.user_id).cloned(),
            address: addresses.get(&booking.address_id).cloned(),
            technician: booking
                .assigned_technician_id
                .and_then(|id| technicians.get(&id).cloned()),
            booking,
        })
        .collect())
}

/// GET /api/admin/bookings?status=&search=
pub async fn list_bookings(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<AdminBookingView>>, ApiError> {
    let bookings = db::bookings::list_all(&state.db, BOOKING_SCAN_LIMIT).await?;
    let views = enrich(&state, bookings).await?;
    Ok(Json(filter.apply(views)))
}

/// GET /api/admin/customers?search=
pub async fn list_customers(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = db::users::list_customers(&state.db).await?;
    Ok(Json(
        search::filter(&customers, query.term())
            .into_iter()
            .cloned()
            .collect(),
    ))
}

/// GET /api/admin/field-teams?search=
pub async fn list_technicians(
    State(state): State<AppState>,
    AdminAuth(_): AdminAuth,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FieldTechnician>>, ApiError> {
    let technicians = db::users::list_technicians(&state.db).await?;
    Ok(Json(
        search::filter(&technicians, query.term())
            .into_iter()
            .cloned()
            .collect(),
    ))
}

/// PUT /api/admin/bookings/{id}/assign
pub async fn assign_technician(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignTechnician>,
) -> Result<Json<MessageResponse>, ApiError> {
    let technician = db::users::get_technician(&state.db, body.technician_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Technician"))?;
    if !technician.active {
        return Err(ApiError::Conflict("Technician is inactive".to_string()));
    }

    if !db::bookings::assign_technician(&state.db, id, technician.id).await? {
        return Err(refused(&state, id).await);
    }

    tracing::info!(
        booking_id = %id,
        technician_id = %technician.id,
        admin_id = %admin_id,
        "Technician assigned"
    );
    Ok(Json(MessageResponse::new("Technician assigned successfully")))
}

/// PUT /api/admin/bookings/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusChange>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !body.status.is_admin_settable() {
        return Err(ApiError::Validation(format!(
            "Status {} is set by the assigned technician",
            body.status
        )));
    }

    if !db::bookings::set_status(&state.db, id, body.status).await? {
        return Err(refused(&state, id).await);
    }

    tracing::info!(booking_id = %id, status = %body.status, admin_id = %admin_id, "Booking status set");
    Ok(Json(MessageResponse::new("Booking status updated successfully")))
}

/// PUT /api/admin/bookings/{id}/reschedule?service_date=&service_time=
pub async fn reschedule(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Path(id): Path<Uuid>,
    Query(body): Query<Reschedule>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service_time = body
        .service_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if !db::bookings::reschedule(&state.db, id, body.service_date, service_time).await? {
        return Err(refused(&state, id).await);
    }

    tracing::info!(
        booking_id = %id,
        service_date = %body.service_date,
        admin_id = %admin_id,
        "Booking rescheduled"
    );
    Ok(Json(MessageResponse::new("Booking rescheduled successfully")))
}

/// DELETE /api/admin/bookings/{id} — cancels; the row is kept.
pub async fn cancel_booking(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !db::bookings::cancel(&state.db, id).await? {
        return Err(refused(&state, id).await);
    }

    tracing::info!(booking_id = %id, admin_id = %admin_id, "Booking cancelled");
    Ok(Json(MessageResponse::new("Booking cancelled successfully")))
}

/// Explain a guarded admin write that changed no row: the booking is
/// either missing or already closed.
async fn refused(state: &AppState, id: Uuid) -> ApiError {
    match db::bookings::get(&state.db, id).await {
        Ok(Some(booking)) => ApiError::Conflict(format!("Booking is already {}", booking.status)),
        Ok(None) => ApiError::not_found("Booking"),
        Err(e) => e.into(),
    }
}
