use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Who is acting. Carried in every token and used to pick a dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Customer,
    FieldTeam,
    Admin,
}

/// Dashboards a signed-in user can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Customer,
    FieldTechnician,
    Admin,
}

impl Role {
    /// The role routing table. Both the unified dashboard endpoint and the
    /// client view router dispatch through here.
    pub const fn dashboard(self) -> DashboardKind {
        match self {
            Role::Customer => DashboardKind::Customer,
            Role::FieldTeam => DashboardKind::FieldTechnician,
            Role::Admin => DashboardKind::Admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTechnician {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub employee_id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Free-form staff title, e.g. "admin" or "ops".
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Compact customer projection embedded in job and admin views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Customer> for CustomerSummary {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechnicianSummary {
    pub id: Uuid,
    pub name: String,
    pub employee_id: String,
}

impl From<&FieldTechnician> for TechnicianSummary {
    fn from(t: &FieldTechnician) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            employee_id: t.employee_id.clone(),
        }
    }
}

/// User block returned with every login and stored in client sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl From<&Customer> for SessionUser {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            email: c.email.clone(),
            name: c.name.clone(),
            role: Role::Customer,
            phone: Some(c.phone.clone()),
            employee_id: None,
            verified: Some(c.verified),
        }
    }
}

impl From<&FieldTechnician> for SessionUser {
    fn from(t: &FieldTechnician) -> Self {
        Self {
            id: t.id,
            email: t.email.clone(),
            name: t.name.clone(),
            role: Role::FieldTeam,
            phone: Some(t.phone.clone()),
            employee_id: Some(t.employee_id.clone()),
            verified: None,
        }
    }
}

impl From<&AdminUser> for SessionUser {
    fn from(a: &AdminUser) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            name: a.name.clone(),
            role: Role::Admin,
            phone: None,
            employee_id: None,
            verified: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterCustomer {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6, max = 128))]
    pub password: String,
    #[garde(length(min = 1, max = 120))]
    pub name: String,
    #[garde(length(min = 5, max = 20))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterTechnician {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6, max = 128))]
    pub password: String,
    #[garde(length(min = 1, max = 120))]
    pub name: String,
    #[garde(length(min = 5, max = 20))]
    pub phone: String,
    #[garde(length(min = 1, max = 40))]
    pub employee_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterAdmin {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6, max = 128))]
    pub password: String,
    #[garde(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default = "default_admin_title", rename = "role")]
    #[garde(length(min = 1, max = 40))]
    pub title: String,
}

fn default_admin_title() -> String {
    "admin".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[garde(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6, max = 6))]
    pub otp: String,
}

/// Response of `POST /api/auth/register`. The customer signs in afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registered {
    pub message: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSent {
    pub message: String,
    /// Only present when the server runs with OTP echo enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}
