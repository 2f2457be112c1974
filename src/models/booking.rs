use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use super::address::Address;
use super::job::{Checklist, IncidentReport};
use super::money::Money;
use super::user::{CustomerSummary, DashboardKind, TechnicianSummary};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TankType {
    Overhead,
    Underground,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PackageType {
    Manual,
    Automated,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    Card,
    Wallet,
    Cod,
}

impl PaymentMethod {
    /// Whether money is collected through the payment gateway before the
    /// booking is confirmed. Cash on delivery confirms immediately.
    pub const fn requires_gateway(self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }
}

/// Booking lifecycle. A booking doubles as a technician job once assigned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Targets an admin may set directly. `in-progress` and `completed`
    /// are reached only through the technician's start and completion.
    pub const fn is_admin_settable(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Cancelled
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Optional extras priced on top of the package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOns {
    pub disinfection: bool,
    pub maintenance: bool,
    pub repair: bool,
}

/// Body of `POST /api/bookings`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreate {
    #[garde(skip)]
    pub address_id: Uuid,

    #[garde(skip)]
    pub tank_type: TankType,

    #[garde(length(min = 1, max = 60))]
    pub tank_capacity: String,

    #[serde(default)]
    #[garde(length(max = 2048))]
    pub tank_photo_url: Option<String>,

    #[garde(skip)]
    pub service_date: NaiveDate,

    #[garde(length(min = 1, max = 40))]
    pub service_time: String,

    #[garde(skip)]
    pub package_type: PackageType,

    #[serde(default)]
    #[garde(skip)]
    pub add_disinfection: bool,

    #[serde(default)]
    #[garde(skip)]
    pub add_maintenance: bool,

    #[serde(default)]
    #[garde(skip)]
    pub add_repair: bool,

    #[garde(skip)]
    pub payment_method: PaymentMethod,
}

impl BookingCreate {
    pub fn add_ons(&self) -> AddOns {
        AddOns {
            disinfection: self.add_disinfection,
            maintenance: self.add_maintenance,
            repair: self.add_repair,
        }
    }
}

/// A booking as stored, including the job execution record once started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub tank_type: TankType,
    pub tank_capacity: String,
    pub tank_photo_url: Option<String>,
    pub service_date: NaiveDate,
    pub service_time: String,
    pub package_type: PackageType,
    pub add_disinfection: bool,
    pub add_maintenance: bool,
    pub add_repair: bool,
    pub payment_method: PaymentMethod,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Paise.
    pub amount: Money,
    pub razorpay_order_id: Option<String>,
    pub assigned_technician_id: Option<Uuid>,
    pub checklist: Option<Checklist>,
    #[serde(default)]
    pub incident_reports: Vec<IncidentReport>,
    #[serde(default)]
    pub before_photos: Vec<String>,
    #[serde(default)]
    pub after_photos: Vec<String>,
    pub customer_signature: Option<String>,
    pub completion_notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn add_ons(&self) -> AddOns {
        AddOns {
            disinfection: self.add_disinfection,
            maintenance: self.add_maintenance,
            repair: self.add_repair,
        }
    }
}

/// `GET /api/field/jobs/{id}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    pub job: Booking,
    pub address: Option<Address>,
    pub customer: Option<CustomerSummary>,
}

/// Booking row enriched for the admin list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: Option<CustomerSummary>,
    pub address: Option<Address>,
    pub technician: Option<TechnicianSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTechnician {
    pub technician_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: BookingStatus,
}

/// Query string of `PUT /api/admin/bookings/{id}/reschedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reschedule {
    pub service_date: NaiveDate,
    pub service_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TechnicianStats {
    pub total_jobs: i64,
    pub today_jobs: i64,
    pub completed_today: i64,
    pub in_progress: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboardStats {
    pub total_customers: i64,
    pub total_technicians: i64,
    pub total_bookings: i64,
    /// Sum of paid booking amounts, in paise.
    pub total_revenue: Money,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub in_progress_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub recent_bookings: Vec<Booking>,
}

/// Body of `GET /api/dashboard`, one variant per role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dashboard {
    Customer {
        recent_bookings: Vec<Booking>,
    },
    FieldTechnician {
        stats: TechnicianStats,
        jobs: Vec<Booking>,
    },
    Admin {
        stats: AdminDashboardStats,
    },
}

impl Dashboard {
    pub fn kind(&self) -> DashboardKind {
        match self {
            Dashboard::Customer { .. } => DashboardKind::Customer,
            Dashboard::FieldTechnician { .. } => DashboardKind::FieldTechnician,
            Dashboard::Admin { .. } => DashboardKind::Admin,
        }
    }
}

/// Body of `POST /api/payments/create-order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrderRequest {
    pub booking_id: Uuid,
}

/// Either a gateway order to collect, or a COD confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentOrderResponse {
    Gateway {
        order_id: String,
        amount: Money,
        currency: String,
        key_id: String,
    },
    Cod {
        payment_method: PaymentMethod,
        message: String,
    },
}

/// Body of `POST /api/payments/verify`, as returned by checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub booking_id: Uuid,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn in_progress_uses_hyphen_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            BookingStatus::from_str("in-progress").unwrap(),
            BookingStatus::InProgress
        );
        assert_eq!(BookingStatus::InProgress.as_ref(), "in-progress");
    }

    #[test]
    fn only_cod_skips_the_gateway() {
        assert!(!PaymentMethod::Cod.requires_gateway());
        assert!(PaymentMethod::Upi.requires_gateway());
        assert!(PaymentMethod::Card.requires_gateway());
        assert!(PaymentMethod::Wallet.requires_gateway());
    }

    #[test]
    fn terminal_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
    }

    #[test]
    fn field_statuses_are_not_admin_settable() {
        assert!(BookingStatus::Confirmed.is_admin_settable());
        assert!(BookingStatus::Cancelled.is_admin_settable());
        assert!(!BookingStatus::InProgress.is_admin_settable());
        assert!(!BookingStatus::Completed.is_admin_settable());
    }

    #[test]
    fn booking_create_defaults_add_ons_to_false() {
        let body = serde_json::json!({
            "address_id": Uuid::nil(),
            "tank_type": "overhead",
            "tank_capacity": "1000L",
            "service_date": "2026-11-02",
            "service_time": "09:00-11:00",
            "package_type": "manual",
            "payment_method": "cod"
        });
        let create: BookingCreate = serde_json::from_value(body).unwrap();
        assert_eq!(create.add_ons(), AddOns::default());
        assert!(create.validate().is_ok());
    }

    #[test]
    fn order_response_shapes() {
        let cod: PaymentOrderResponse =
            serde_json::from_str(r#"{"payment_method":"cod","message":"Booking confirmed"}"#)
                .unwrap();
        assert!(matches!(cod, PaymentOrderResponse::Cod { payment_method: PaymentMethod::Cod, .. }));

        let gateway: PaymentOrderResponse = serde_json::from_str(
            r#"{"order_id":"order_1","amount":200000,"currency":"INR","key_id":"rzp_test"}"#,
        )
        .unwrap();
        assert_eq!(
            gateway,
            PaymentOrderResponse::Gateway {
                order_id: "order_1".into(),
                amount: Money::from_rupees(2000),
                currency: "INR".into(),
                key_id: "rzp_test".into(),
            }
        );
    }
}
