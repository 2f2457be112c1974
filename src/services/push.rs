use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use super::notifications::Notification;
use super::queue::QueuedNotification;

/// Body posted to the push transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub booking_id: Option<Uuid>,
    #[serde(flatten)]
    pub notification: Notification,
}

impl From<&QueuedNotification> for PushMessage {
    fn from(queued: &QueuedNotification) -> Self {
        Self {
            id: queued.id,
            recipient_id: queued.recipient_id,
            booking_id: queued.booking_id,
            notification: queued.event.render(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No transport configured; the message was only logged.
    Logged,
}

/// Hands rendered notifications to the push gateway.
pub struct PushClient {
    http: Client,
    gateway_url: Option<String>,
}

impl PushClient {
    pub fn new(gateway_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            gateway_url: gateway_url.filter(|u| !u.trim().is_empty()),
        }
    }

    pub async fn deliver(&self, queued: &QueuedNotification) -> Result<Delivery, PushError> {
        let message = PushMessage::from(queued);

        let Some(url) = &self.gateway_url else {
            tracing::info!(
                notification_id = %message.id,
                recipient_id = %message.recipient_id,
                title = %message.notification.title,
                body = %message.notification.body,
                "Push gateway not configured, notification logged"
            );
            return Ok(Delivery::Logged);
        };

        let response = self.http.post(url).json(&message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(Delivery::Sent)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },
}
