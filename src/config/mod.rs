use serde::Deserialize;

use crate::app_state::Settings;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8001"). Optional for the worker.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string for the notification queue and OTP codes
    pub redis_url: String,

    /// HS256 secret for bearer tokens
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: i64,

    #[serde(default)]
    pub razorpay_key_id: String,

    #[serde(default)]
    pub razorpay_key_secret: String,

    /// Comma-separated allowed origins, or "*"
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Maps/geocoding key handed to clients
    #[serde(default)]
    pub maps_api_key: Option<String>,

    /// Push transport endpoint used by the worker. Notifications are only
    /// logged when unset.
    #[serde(default)]
    pub push_gateway_url: Option<String>,

    #[serde(default)]
    pub otp_debug: bool,

    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,

    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8001".to_string()
}

fn default_jwt_expiration_hours() -> i64 {
    720
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            otp_debug: self.otp_debug,
            maps_api_key: self
                .maps_api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
        }
    }

    /// Explicit origins, or `None` for any origin.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}
