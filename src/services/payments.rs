use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::models::money::Money;

const RAZORPAY_API: &str = "https://api.razorpay.com/v1";

type HmacSha256 = Hmac<Sha256>;

/// Client for the Razorpay orders API.
pub struct RazorpayClient {
    http: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Serialize)]
struct OrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

/// An order created at the gateway, ready for checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Paise.
    pub amount: Money,
    pub currency: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self::with_base_url(RAZORPAY_API.to_string(), key_id, key_secret)
    }

    pub fn with_base_url(base_url: String, key_id: String, key_secret: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            key_id,
            key_secret,
        }
    }

    /// Public key handed to checkout.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create an INR order for `amount`. `receipt` is our booking id.
    pub async fn create_order(&self, amount: Money, receipt: &str) -> Result<GatewayOrder, PaymentError> {
        if self.key_id.is_empty() || self.key_secret.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&OrderRequest {
                amount: amount.paise(),
                currency: "INR",
                receipt,
                payment_capture: 1,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway { status: status.as_u16(), body });
        }

        Ok(response.json::<GatewayOrder>().await?)
    }

    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature_matches(&self.key_secret, order_id, payment_id, signature)
    }
}

/// Expected checkout signature: hex HMAC-SHA256 of `order_id|payment_id`.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Ok(given) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    mac.verify_slice(&given).is_ok()
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment gateway credentials are not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {body}")]
    Gateway { status: u16, body: String },
}
