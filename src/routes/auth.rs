use axum::extract::State;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::auth::{hash_password, verify_password, AuthError, CustomerAuth};
use crate::db;
use crate::error::ApiError;
use crate::models::user::{
    AuthResponse, Customer, LoginRequest, OtpSent, RegisterCustomer, Registered, Role,
    SendOtpRequest, SessionUser, VerifyOtpRequest,
};
use crate::models::MessageResponse;

/// POST /api/auth/register — create an unverified customer account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterCustomer>,
) -> Result<Json<Registered>, ApiError> {
    body.validate()?;

    if db::users::find_customer_by_email(&state.db, &body.email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)?;
    let customer = db::users::create_customer(
        &state.db,
        &body.email,
        body.name.trim(),
        body.phone.trim(),
        &password_hash,
    )
    .await?;

    tracing::info!(user_id = %customer.id, "Customer registered");

    Ok(Json(Registered {
        message: "User registered successfully".to_string(),
        email: customer.email,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    body.validate()?;

    let customer = db::users::find_customer_by_email(&state.db, &body.email)
        .await?
        .filter(|c| verify_password(&body.password, &c.password_hash))
        .ok_or(AuthError::InvalidCredentials)?;

    let token = state.auth.issue(customer.id, Role::Customer)?;
    Ok(Json(AuthResponse {
        token,
        user: SessionUser::from(&customer),
    }))
}

/// POST /api/auth/send-otp — issue a 6-digit code valid for ten minutes.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<OtpSent>, ApiError> {
    body.validate()?;

    let code = state.otp.issue(&body.email).await?;
    // TODO: hand the code to an email transport once one is configured.
    tracing::info!(email = %body.email, "OTP issued");

    Ok(Json(OtpSent {
        message: "OTP sent successfully".to_string(),
        otp: state.settings.otp_debug.then_some(code),
    }))
}

/// POST /api/auth/verify-otp — marks the customer verified on success.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    body.validate()?;

    state.otp.verify(&body.email, &body.otp).await?;
    if !db::users::mark_customer_verified(&state.db, &body.email).await? {
        tracing::warn!(email = %body.email, "OTP verified for an unknown customer");
    }

    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
) -> Result<Json<Customer>, ApiError> {
    db::users::get_customer(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User"))
}
