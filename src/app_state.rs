use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::AuthKeys;
use crate::services::{otp::OtpStore, payments::RazorpayClient, queue::NotificationQueue};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthKeys>,
    pub otp: Arc<OtpStore>,
    pub notifications: Arc<NotificationQueue>,
    pub payments: Arc<RazorpayClient>,
    pub settings: Arc<Settings>,
}

/// Request-time settings that handlers read.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Echo issued OTPs in the response. Development only.
    pub otp_debug: bool,
    pub maps_api_key: Option<String>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        auth: AuthKeys,
        otp: OtpStore,
        notifications: NotificationQueue,
        payments: RazorpayClient,
        settings: Settings,
    ) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
            otp: Arc::new(otp),
            notifications: Arc::new(notifications),
            payments: Arc::new(payments),
            settings: Arc::new(settings),
        }
    }
}
