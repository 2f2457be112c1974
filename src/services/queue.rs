use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notifications::NotificationEvent;

const QUEUE_KEY: &str = "aquaclean:notifications";
const PROCESSING_KEY: &str = "aquaclean:notifications:processing";

/// Notification payload serialized into Redis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedNotification {
    pub id: Uuid,
    /// Customer the notification is addressed to.
    pub recipient_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub event: NotificationEvent,
}

impl QueuedNotification {
    pub fn new(recipient_id: Uuid, booking_id: Option<Uuid>, event: NotificationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            booking_id,
            event,
        }
    }
}

/// Redis list of notifications waiting for the delivery worker.
pub struct NotificationQueue {
    client: redis::Client,
}

impl NotificationQueue {
    pub fn new(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        Ok(Self { client })
    }

    pub async fn enqueue(&self, notification: &QueuedNotification) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(notification)?;
        conn.lpush::<_, _, ()>(QUEUE_KEY, &payload).await?;
        metrics::counter!("notifications_enqueued_total", "type" => notification.event.kind())
            .increment(1);
        Ok(())
    }

    /// Pop the oldest notification, parking it in the processing list until
    /// [`complete`](Self::complete) is called.
    pub async fn dequeue(&self) -> Result<Option<QueuedNotification>, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: Option<String> = conn.rpoplpush(QUEUE_KEY, PROCESSING_KEY).await?;

        match result {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn complete(&self, notification: &QueuedNotification) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(notification)?;
        conn.lrem::<_, _, ()>(PROCESSING_KEY, 1, &payload).await?;
        Ok(())
    }

    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let depth: u64 = conn.llen(QUEUE_KEY).await?;
        Ok(depth)
    }

    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
