use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Prometheus scrape endpoint, text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Register descriptions for every metric the server and worker emit.
pub fn describe() {
    metrics::describe_counter!("bookings_created_total", "Bookings created, by package");
    metrics::describe_counter!("jobs_started_total", "Jobs moved to in-progress");
    metrics::describe_counter!("jobs_completed_total", "Jobs completed with evidence");
    metrics::describe_counter!(
        "incidents_reported_total",
        "Incident reports filed, by severity"
    );
    metrics::describe_counter!("payments_verified_total", "Gateway payments verified");
    metrics::describe_counter!(
        "payments_failed_total",
        "Gateway payments that failed, by stage"
    );
    metrics::describe_counter!(
        "notifications_enqueued_total",
        "Push notifications queued, by type"
    );
    metrics::describe_counter!(
        "notifications_delivered_total",
        "Push notifications handed to the transport"
    );
    metrics::describe_gauge!(
        "notification_queue_depth",
        "Notifications waiting for the worker"
    );
}
