use aquaclean::{
    config::AppConfig,
    services::{
        push::{Delivery, PushClient},
        queue::NotificationQueue,
    },
};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL_MS: u64 = 1000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting notification worker");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let queue = NotificationQueue::new(&config.redis_url).expect("Failed to initialize queue");
    let push = PushClient::new(config.push_gateway_url.clone());

    tracing::info!("Worker ready, starting delivery loop");

    loop {
        match deliver_next(&queue, &push).await {
            Ok(true) => {
                tracing::debug!("Notification handled, checking for next");
            }
            Ok(false) => {
                tracing::trace!("Queue empty, sleeping");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Queue error, will retry");
                sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
            }
        }
    }
}

/// Deliver the oldest queued notification.
/// Returns Ok(false) when the queue is empty.
async fn deliver_next(
    queue: &NotificationQueue,
    push: &PushClient,
) -> Result<bool, Box<dyn std::error::Error>> {
    if let Ok(depth) = queue.queue_depth().await {
        metrics::gauge!("notification_queue_depth").set(depth as f64);
    }

    let Some(notification) = queue.dequeue().await? else {
        return Ok(false);
    };

    match push.deliver(&notification).await {
        Ok(delivery) => {
            if delivery == Delivery::Sent {
                metrics::counter!("notifications_delivered_total").increment(1);
            }
            tracing::info!(
                notification_id = %notification.id,
                kind = notification.event.kind(),
                ?delivery,
                "Notification delivered"
            );
        }
        // Push is best-effort: a rejected message is dropped, not retried.
        Err(e) => {
            tracing::warn!(
                notification_id = %notification.id,
                kind = notification.event.kind(),
                error = %e,
                "Notification delivery failed, dropping"
            );
        }
    }

    queue.complete(&notification).await?;
    Ok(true)
}
