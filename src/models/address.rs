use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer-owned service location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Label such as "Home" or "Office".
    pub name: String,
    pub address_line: String,
    pub landmark: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/addresses` and `PUT /api/addresses/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressInput {
    #[garde(length(min = 1, max = 60))]
    pub name: String,

    #[garde(length(min = 1, max = 500))]
    pub address_line: String,

    #[serde(default)]
    #[garde(length(max = 200))]
    pub landmark: Option<String>,

    #[serde(default)]
    #[garde(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,

    #[serde(default)]
    #[garde(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
}
