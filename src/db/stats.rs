use sqlx::{PgPool, Row};

use super::bookings;
use crate::models::booking::AdminDashboardStats;
use crate::models::money::Money;

const RECENT_BOOKINGS: i64 = 5;

/// Headline numbers for the admin dashboard.
///
/// Revenue only counts bookings whose payment completed.
pub async fn admin_dashboard(pool: &PgPool) -> Result<AdminDashboardStats, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM customers) AS total_customers,
            (SELECT COUNT(*) FROM field_technicians) AS total_technicians,
            COUNT(*) AS total_bookings,
            COALESCE(SUM(amount) FILTER (WHERE payment_status = 'completed'), 0)::BIGINT AS total_revenue,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending_bookings,
            COUNT(*) FILTER (WHERE status = 'confirmed') AS confirmed_bookings,
            COUNT(*) FILTER (WHERE status = 'in-progress') AS in_progress_bookings,
            COUNT(*) FILTER (WHERE status = 'completed') AS completed_bookings,
            COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled_bookings
        FROM bookings
        "#,
    )
    .fetch_one(pool)
    .await?;

    let recent_bookings = bookings::list_all(pool, RECENT_BOOKINGS).await?;

    Ok(AdminDashboardStats {
        total_customers: row.try_get("total_customers")?,
        total_technicians: row.try_get("total_technicians")?,
        total_bookings: row.try_get("total_bookings")?,
        total_revenue: Money::from_paise(row.try_get("total_revenue")?),
        pending_bookings: row.try_get("pending_bookings")?,
        confirmed_bookings: row.try_get("confirmed_bookings")?,
        in_progress_bookings: row.try_get("in_progress_bookings")?,
        completed_bookings: row.try_get("completed_bookings")?,
        cancelled_bookings: row.try_get("cancelled_bookings")?,
        recent_bookings,
    })
}
