//! Field technician endpoints: sign-in, assigned jobs and job execution.
//!
//! Request bodies are checked before the job is loaded, so malformed
//! updates and missing completion evidence never reach the database.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{hash_password, verify_password, AdminAuth, AuthError, TechnicianAuth};
use crate::db;
use crate::error::ApiError;
use crate::models::booking::{Booking, JobDetail, TechnicianStats};
use crate::models::job::{
    ChecklistUpdate, CompletionInput, IncidentCreated, IncidentInput, JobStarted,
};
use crate::models::user::{
    AuthResponse, CustomerSummary, FieldTechnician, LoginRequest, RegisterTechnician, Role,
    SessionUser,
};
use crate::models::MessageResponse;
use crate::services::job_tracker;
use crate::services::notifications::NotificationEvent;

use super::notify;

const CONCURRENT_CHANGE: &str = "Job status changed, reload and retry";

/// POST /api/field/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    body.validate()?;

    let technician = db::users::find_technician_by_email(&state.db, &body.email)
        .await?
        .filter(|t| verify_password(&body.password, &t.password_hash))
        .ok_or(AuthError::InvalidCredentials)?;

    if !technician.active {
        return Err(ApiError::Forbidden("Account is inactive".to_string()));
    }

    let token = state.auth.issue(technician.id, Role::FieldTeam)?;
    Ok(Json(AuthResponse {
        token,
        user: SessionUser::from(&technician),
    }))
}

/// POST /api/field/register — admins onboard technicians.
pub async fn register(
    State(state): State<AppState>,
    AdminAuth(admin_id): AdminAuth,
    Json(body): Json<RegisterTechnician>,
) -> Result<(StatusCode, Json<FieldTechnician>), ApiError> {
    body.validate()?;

    if db::users::find_technician_by_email(&state.db, &body.email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)?;
    let technician = db::users::create_technician(
        &state.db,
        &body.email,
        body.name.trim(),
        body.phone.trim(),
        body.employee_id.trim(),
        &password_hash,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ApiError::BadRequest("Employee id already registered".to_string())
        }
        other => other.into(),
    })?;

    tracing::info!(
        technician_id = %technician.id,
        registered_by = %admin_id,
        "Field technician registered"
    );

    Ok((StatusCode::CREATED, Json(technician)))
}

/// GET /api/field/me
pub async fn me(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
) -> Result<Json<FieldTechnician>, ApiError> {
    db::users::get_technician(&state.db, technician_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Technician"))
}

/// GET /api/field/stats
pub async fn stats(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
) -> Result<Json<TechnicianStats>, ApiError> {
    let stats =
        db::bookings::technician_stats(&state.db, technician_id, db::bookings::today()).await?;
    Ok(Json(stats))
}

/// GET /api/field/jobs — confirmed and in-progress jobs, soonest first.
pub async fn list_jobs(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(
        db::bookings::list_for_technician(&state.db, technician_id).await?,
    ))
}

async fn load_job(state: &AppState, id: Uuid, technician_id: Uuid) -> Result<Booking, ApiError> {
    db::bookings::get_for_technician(&state.db, id, technician_id)
        .await?
        .ok_or_else(|| job_tracker::JobError::NotAssigned.into())
}

/// GET /api/field/jobs/{id} — the job with its address and customer.
pub async fn get_job(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<JobDetail>, ApiError> {
    let job = load_job(&state, id, technician_id).await?;
    let address = db::addresses::get(&state.db, job.address_id).await?;
    let customer = db::users::get_customer(&state.db, job.user_id)
        .await?
        .as_ref()
        .map(CustomerSummary::from);

    Ok(Json(JobDetail {
        job,
        address,
        customer,
    }))
}

/// POST /api/field/jobs/{id}/start
pub async fn start_job(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStarted>, ApiError> {
    let job = load_job(&state, id, technician_id).await?;
    let checklist = job_tracker::start(&job, technician_id, Utc::now())?;

    if !db::bookings::start_job(&state.db, id, technician_id, &checklist).await? {
        return Err(ApiError::Conflict(CONCURRENT_CHANGE.to_string()));
    }

    metrics::counter!("jobs_started_total").increment(1);
    tracing::info!(job_id = %id, technician_id = %technician_id, "Job started");
    notify(&state, job.user_id, id, NotificationEvent::ServiceStarted).await;

    Ok(Json(JobStarted {
        message: "Job started successfully".to_string(),
        checklist,
    }))
}

/// POST|PUT /api/field/jobs/{id}/checklist — set one step's outcome.
pub async fn update_checklist(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<ChecklistUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    job_tracker::parse_step_update(&body)?;

    let job = load_job(&state, id, technician_id).await?;
    let (step, write) = job_tracker::apply_step_update(&job, technician_id, &body, Utc::now())?;

    if !db::bookings::update_checklist_step(&state.db, id, technician_id, step, &write).await? {
        return Err(ApiError::Conflict(CONCURRENT_CHANGE.to_string()));
    }

    tracing::info!(
        job_id = %id,
        step = %step,
        status = %write.status,
        photo = write.photo_url.is_some(),
        "Checklist step updated"
    );

    Ok(Json(MessageResponse::new("Checklist updated successfully")))
}

/// POST /api/field/jobs/{id}/incident — append an incident report.
pub async fn report_incident(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<IncidentInput>,
) -> Result<(StatusCode, Json<IncidentCreated>), ApiError> {
    job_tracker::validate_incident(&body)?;

    let job = load_job(&state, id, technician_id).await?;
    let incident = job_tracker::new_incident(&job, technician_id, body, Utc::now())?;

    if !db::bookings::append_incident(&state.db, id, technician_id, &incident).await? {
        return Err(ApiError::Conflict(CONCURRENT_CHANGE.to_string()));
    }

    metrics::counter!("incidents_reported_total", "severity" => incident.severity.as_ref().to_string())
        .increment(1);
    if incident.unable_to_proceed {
        tracing::warn!(
            job_id = %id,
            incident_id = %incident.id,
            severity = %incident.severity,
            "Technician unable to proceed"
        );
    } else {
        tracing::info!(job_id = %id, incident_id = %incident.id, "Incident reported");
    }

    Ok((
        StatusCode::CREATED,
        Json(IncidentCreated {
            message: "Incident reported successfully".to_string(),
            incident_id: incident.id,
        }),
    ))
}

/// POST /api/field/jobs/{id}/complete — close the job with evidence.
pub async fn complete_job(
    State(state): State<AppState>,
    TechnicianAuth(technician_id): TechnicianAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<CompletionInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let evidence = job_tracker::validate_evidence(body)?;

    let job = load_job(&state, id, technician_id).await?;
    job_tracker::complete(&job, technician_id)?;

    if !db::bookings::complete_job(&state.db, id, technician_id, &evidence).await? {
        return Err(ApiError::Conflict(CONCURRENT_CHANGE.to_string()));
    }

    metrics::counter!("jobs_completed_total").increment(1);
    tracing::info!(
        job_id = %id,
        technician_id = %technician_id,
        before_photos = evidence.before_photos.len(),
        after_photos = evidence.after_photos.len(),
        "Job completed"
    );
    notify(&state, job.user_id, id, NotificationEvent::ServiceCompleted).await;

    Ok(Json(MessageResponse::new("Job completed successfully")))
}
