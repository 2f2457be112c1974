//! HTTP client for the AquaClean API.
//!
//! Each operation is a single request awaited to completion. There are no
//! retries; a 401 from any endpoint signs the user out.

pub mod dashboard;
pub mod job;
pub mod session;
pub mod wizard;

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::address::{Address, AddressInput};
use crate::models::booking::{
    AdminBookingView, AdminDashboardStats, AssignTechnician, Booking, BookingCreate, BookingStatus,
    Dashboard, JobDetail, PaymentOrderRequest, PaymentOrderResponse, StatusChange,
    TechnicianStats, VerifyPaymentRequest,
};
use crate::models::job::{
    ChecklistUpdate, CompletionInput, IncidentCreated, IncidentInput, JobStarted,
};
use crate::models::user::{
    AuthResponse, Customer, FieldTechnician, LoginRequest, OtpSent, RegisterCustomer, Registered,
    DashboardKind, Role, SendOtpRequest, SessionUser, VerifyOtpRequest,
};
use crate::models::MessageResponse;
use crate::routes::maps::MapsConfig;
use crate::services::job_tracker::JobError;
use crate::services::search::BookingFilter;

use session::{Session, SessionError, SessionStore};
use wizard::WizardError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the token; the session has been cleared.
    #[error("Session expired, please sign in again")]
    Unauthorized,

    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Expected the {expected:?} dashboard, got {actual:?}")]
    DashboardMismatch {
        expected: DashboardKind,
        actual: DashboardKind,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear()?;
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    // ── Auth ────────────────────────────────────────────────────────

    pub async fn register(&self, body: &RegisterCustomer) -> Result<Registered, ClientError> {
        self.post("/api/auth/register", body).await
    }

    /// Sign in on the portal for `role` and save the session.
    pub async fn login(&self, role: Role, body: &LoginRequest) -> Result<SessionUser, ClientError> {
        let path = match role {
            Role::Customer => "/api/auth/login",
            Role::FieldTeam => "/api/field/login",
            Role::Admin => "/api/admin/login",
        };
        let auth: AuthResponse = self.post(path, body).await?;
        let user = auth.user.clone();
        self.session.save(Session::from(auth))?;
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        Ok(self.session.clear()?)
    }

    pub async fn send_otp(&self, email: &str) -> Result<OtpSent, ClientError> {
        let body = SendOtpRequest {
            email: email.to_string(),
        };
        self.post("/api/auth/send-otp", &body).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<MessageResponse, ClientError> {
        let body = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        self.post("/api/auth/verify-otp", &body).await
    }

    pub async fn me(&self) -> Result<Customer, ClientError> {
        self.get("/api/auth/me").await
    }

    // ── Customer ────────────────────────────────────────────────────

    pub async fn addresses(&self) -> Result<Vec<Address>, ClientError> {
        self.get("/api/addresses").await
    }

    pub async fn create_address(&self, body: &AddressInput) -> Result<Address, ClientError> {
        self.post("/api/addresses", body).await
    }

    pub async fn delete_address(&self, id: Uuid) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/api/addresses/{id}")))
            .await
    }

    pub async fn create_booking(&self, body: &BookingCreate) -> Result<Booking, ClientError> {
        self.post("/api/bookings", body).await
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>, ClientError> {
        self.get("/api/bookings").await
    }

    pub async fn booking(&self, id: Uuid) -> Result<Booking, ClientError> {
        self.get(&format!("/api/bookings/{id}")).await
    }

    pub async fn create_payment_order(
        &self,
        booking_id: Uuid,
    ) -> Result<PaymentOrderResponse, ClientError> {
        self.post(
            "/api/payments/create-order",
            &PaymentOrderRequest { booking_id },
        )
        .await
    }

    pub async fn verify_payment(
        &self,
        body: &VerifyPaymentRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.post("/api/payments/verify", body).await
    }

    pub async fn maps_config(&self) -> Result<MapsConfig, ClientError> {
        self.get("/api/maps/config").await
    }

    pub async fn dashboard(&self) -> Result<Dashboard, ClientError> {
        self.get("/api/dashboard").await
    }

    // ── Field ───────────────────────────────────────────────────────

    pub async fn field_jobs(&self) -> Result<Vec<Booking>, ClientError> {
        self.get("/api/field/jobs").await
    }

    pub async fn field_job(&self, id: Uuid) -> Result<JobDetail, ClientError> {
        self.get(&format!("/api/field/jobs/{id}")).await
    }

    pub async fn field_stats(&self) -> Result<TechnicianStats, ClientError> {
        self.get("/api/field/stats").await
    }

    pub async fn field_me(&self) -> Result<FieldTechnician, ClientError> {
        self.get("/api/field/me").await
    }

    pub(crate) async fn start_job(&self, id: Uuid) -> Result<JobStarted, ClientError> {
        self.post(&format!("/api/field/jobs/{id}/start"), &serde_json::json!({}))
            .await
    }

    pub(crate) async fn update_checklist(
        &self,
        id: Uuid,
        body: &ChecklistUpdate,
    ) -> Result<MessageResponse, ClientError> {
        self.put(&format!("/api/field/jobs/{id}/checklist"), body).await
    }

    pub(crate) async fn report_incident(
        &self,
        id: Uuid,
        body: &IncidentInput,
    ) -> Result<IncidentCreated, ClientError> {
        self.post(&format!("/api/field/jobs/{id}/incident"), body).await
    }

    pub(crate) async fn complete_job(
        &self,
        id: Uuid,
        body: &CompletionInput,
    ) -> Result<MessageResponse, ClientError> {
        self.post(&format!("/api/field/jobs/{id}/complete"), body).await
    }

    // ── Admin ───────────────────────────────────────────────────────

    pub async fn admin_stats(&self) -> Result<AdminDashboardStats, ClientError> {
        self.get("/api/admin/dashboard-stats").await
    }

    pub async fn admin_bookings(
        &self,
        filter: &BookingFilter,
    ) -> Result<Vec<AdminBookingView>, ClientError> {
        self.send(self.request(Method::GET, "/api/admin/bookings").query(filter))
            .await
    }

    pub async fn admin_customers(&self, search: &str) -> Result<Vec<Customer>, ClientError> {
        self.send(
            self.request(Method::GET, "/api/admin/customers")
                .query(&[("search", search)]),
        )
        .await
    }

    pub async fn admin_technicians(
        &self,
        search: &str,
    ) -> Result<Vec<FieldTechnician>, ClientError> {
        self.send(
            self.request(Method::GET, "/api/admin/field-teams")
                .query(&[("search", search)]),
        )
        .await
    }

    pub async fn assign_technician(
        &self,
        booking_id: Uuid,
        technician_id: Uuid,
    ) -> Result<MessageResponse, ClientError> {
        self.put(
            &format!("/api/admin/bookings/{booking_id}/assign"),
            &AssignTechnician { technician_id },
        )
        .await
    }

    pub async fn set_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<MessageResponse, ClientError> {
        self.put(
            &format!("/api/admin/bookings/{booking_id}/status"),
            &StatusChange { status },
        )
        .await
    }

    pub async fn reschedule_booking(
        &self,
        booking_id: Uuid,
        service_date: NaiveDate,
        service_time: Option<&str>,
    ) -> Result<MessageResponse, ClientError> {
        let mut query = vec![("service_date", service_date.to_string())];
        if let Some(time) = service_time {
            query.push(("service_time", time.to_string()));
        }
        self.send(
            self.request(
                Method::PUT,
                &format!("/api/admin/bookings/{booking_id}/reschedule"),
            )
            .query(&query),
        )
        .await
    }

    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/api/admin/bookings/{booking_id}")))
            .await
    }
}
