use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::parse_column;
use crate::models::booking::{
    Booking, BookingCreate, BookingStatus, PaymentStatus, TechnicianStats,
};
use crate::models::job::{Checklist, ChecklistStep, CompletionEvidence, IncidentReport, StepWrite};
use crate::models::money::Money;

const COLUMNS: &str = r#"
    id, user_id, address_id, tank_type, tank_capacity, tank_photo_url,
    service_date, service_time, package_type, add_disinfection, add_maintenance,
    add_repair, payment_method, status, payment_status, amount, razorpay_order_id,
    assigned_technician_id, checklist, incident_reports, before_photos, after_photos,
    customer_signature, completion_notes, started_at, completed_at, created_at, updated_at
"#;

fn booking_from_row(r: &PgRow) -> Result<Booking, sqlx::Error> {
    let tank_type: String = r.try_get("tank_type")?;
    let package_type: String = r.try_get("package_type")?;
    let payment_method: String = r.try_get("payment_method")?;
    let status: String = r.try_get("status")?;
    let payment_status: String = r.try_get("payment_status")?;
    let checklist: Option<Json<Checklist>> = r.try_get("checklist")?;
    let incidents: Json<Vec<IncidentReport>> = r.try_get("incident_reports")?;

    Ok(Booking {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        address_id: r.try_get("address_id")?,
        tank_type: parse_column("tank_type", &tank_type)?,
        tank_capacity: r.try_get("tank_capacity")?,
        tank_photo_url: r.try_get("tank_photo_url")?,
        service_date: r.try_get("service_date")?,
        service_time: r.try_get("service_time")?,
        package_type: parse_column("package_type", &package_type)?,
        add_disinfection: r.try_get("add_disinfection")?,
        add_maintenance: r.try_get("add_maintenance")?,
        add_repair: r.try_get("add_repair")?,
        payment_method: parse_column("payment_method", &payment_method)?,
        status: parse_column("status", &status)?,
        payment_status: parse_column("payment_status", &payment_status)?,
        amount: Money::from_paise(r.try_get("amount")?),
        razorpay_order_id: r.try_get("razorpay_order_id")?,
        assigned_technician_id: r.try_get("assigned_technician_id")?,
        checklist: checklist.map(|c| c.0),
        incident_reports: incidents.0,
        before_photos: r.try_get("before_photos")?,
        after_photos: r.try_get("after_photos")?,
        customer_signature: r.try_get("customer_signature")?,
        completion_notes: r.try_get("completion_notes")?,
        started_at: r.try_get("started_at")?,
        completed_at: r.try_get("completed_at")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

// ── Customer bookings ───────────────────────────────────────────────

/// Insert a pending booking. `amount` is computed by the caller.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: &BookingCreate,
    amount: Money,
) -> Result<Booking, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO bookings (
            user_id, address_id, tank_type, tank_capacity, tank_photo_url,
            service_date, service_time, package_type, add_disinfection,
            add_maintenance, add_repair, payment_method, amount
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(input.address_id)
    .bind(input.tank_type.as_ref())
    .bind(&input.tank_capacity)
    .bind(&input.tank_photo_url)
    .bind(input.service_date)
    .bind(&input.service_time)
    .bind(input.package_type.as_ref())
    .bind(input.add_disinfection)
    .bind(input.add_maintenance)
    .bind(input.add_repair)
    .bind(input.payment_method.as_ref())
    .bind(amount.paise())
    .fetch_one(pool)
    .await?;

    booking_from_row(&row)
}

pub async fn list_for_customer(pool: &PgPool, user_id: Uuid) -> Result<Vec<Booking>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(booking_from_row).collect()
}

pub async fn get_for_customer(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(|r| booking_from_row(&r))
    .transpose()
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query(&format!("SELECT {COLUMNS} FROM bookings WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(|r| booking_from_row(&r))
        .transpose()
}

// ── Payments ────────────────────────────────────────────────────────

pub async fn set_payment_order(pool: &PgPool, id: Uuid, order_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE bookings SET razorpay_order_id = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Record a payment outcome. Confirms a still-pending booking when asked.
/// A completed payment is never replaced.
pub async fn record_payment(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    payment_status: PaymentStatus,
    confirm: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET payment_status = CASE WHEN payment_status = 'completed' THEN payment_status ELSE $3 END,
            status = CASE WHEN $4 AND status = 'pending' THEN 'confirmed' ELSE status END,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(payment_status.as_ref())
    .bind(confirm)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ── Field jobs ──────────────────────────────────────────────────────

/// Open jobs assigned to a technician, soonest first.
pub async fn list_for_technician(
    pool: &PgPool,
    technician_id: Uuid,
) -> Result<Vec<Booking>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {COLUMNS} FROM bookings
        WHERE assigned_technician_id = $1 AND status IN ('confirmed', 'in-progress')
        ORDER BY service_date ASC, service_time ASC
        LIMIT 100
        "#
    ))
    .bind(technician_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(booking_from_row).collect()
}

pub async fn get_for_technician(
    pool: &PgPool,
    id: Uuid,
    technician_id: Uuid,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE id = $1 AND assigned_technician_id = $2"
    ))
    .bind(id)
    .bind(technician_id)
    .fetch_optional(pool)
    .await?
    .map(|r| booking_from_row(&r))
    .transpose()
}

/// `confirmed -> in-progress`. False when the job moved on concurrently.
pub async fn start_job(
    pool: &PgPool,
    id: Uuid,
    technician_id: Uuid,
    checklist: &Checklist,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = 'in-progress', checklist = $3, started_at = $4, updated_at = NOW()
        WHERE id = $1 AND assigned_technician_id = $2 AND status = 'confirmed'
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(Json(checklist))
    .bind(checklist.started_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Write one checklist step in place. Only applies while in progress.
///
/// The record is rebuilt from the stored row inside the UPDATE, so photos
/// appended by concurrent writers are all kept.
pub async fn update_checklist_step(
    pool: &PgPool,
    id: Uuid,
    technician_id: Uuid,
    step: ChecklistStep,
    write: &StepWrite,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET checklist = jsonb_set(
                checklist,
                ARRAY['steps', $3::text],
                jsonb_build_object(
                    'status', $4::jsonb,
                    'notes', COALESCE($5::text, checklist #>> ARRAY['steps', $3::text, 'notes'], ''),
                    'timestamp', $6::jsonb,
                    'photos', COALESCE(checklist #> ARRAY['steps', $3::text, 'photos'], '[]'::jsonb)
                        || CASE WHEN $7::text IS NULL THEN '[]'::jsonb
                                ELSE jsonb_build_array($7::text) END
                ),
                TRUE
            ),
            updated_at = NOW()
        WHERE id = $1 AND assigned_technician_id = $2
          AND status = 'in-progress' AND checklist IS NOT NULL
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(step.as_ref())
    .bind(Json(write.status))
    .bind(write.notes.as_deref())
    .bind(Json(write.timestamp))
    .bind(write.photo_url.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Append an incident. Refused once the job is completed or cancelled.
pub async fn append_incident(
    pool: &PgPool,
    id: Uuid,
    technician_id: Uuid,
    incident: &IncidentReport,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET incident_reports = incident_reports || jsonb_build_array($3::jsonb),
            updated_at = NOW()
        WHERE id = $1 AND assigned_technician_id = $2
          AND status NOT IN ('completed', 'cancelled')
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(Json(incident))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// `in-progress -> completed` with evidence.
pub async fn complete_job(
    pool: &PgPool,
    id: Uuid,
    technician_id: Uuid,
    evidence: &CompletionEvidence,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = 'completed',
            completed_at = NOW(),
            before_photos = $3,
            after_photos = $4,
            customer_signature = $5,
            completion_notes = $6,
            updated_at = NOW()
        WHERE id = $1 AND assigned_technician_id = $2 AND status = 'in-progress'
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(&evidence.before_photos)
    .bind(&evidence.after_photos)
    .bind(&evidence.signature)
    .bind(&evidence.notes)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn technician_stats(
    pool: &PgPool,
    technician_id: Uuid,
    today: NaiveDate,
) -> Result<TechnicianStats, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS total_jobs,
            COUNT(*) FILTER (WHERE service_date = $2) AS today_jobs,
            COUNT(*) FILTER (WHERE service_date = $2 AND status = 'completed') AS completed_today,
            COUNT(*) FILTER (WHERE status = 'in-progress') AS in_progress
        FROM bookings
        WHERE assigned_technician_id = $1
        "#,
    )
    .bind(technician_id)
    .bind(today)
    .fetch_one(pool)
    .await?;

    Ok(TechnicianStats {
        total_jobs: row.try_get("total_jobs")?,
        today_jobs: row.try_get("today_jobs")?,
        completed_today: row.try_get("completed_today")?,
        in_progress: row.try_get("in_progress")?,
    })
}

// ── Admin ───────────────────────────────────────────────────────────

pub async fn list_all(pool: &PgPool, limit: i64) -> Result<Vec<Booking>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM bookings ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(booking_from_row).collect()
}

/// Admin writes are last-write-wins among open bookings; each stamps
/// `updated_at`. Completed and cancelled bookings are left untouched and
/// the write reports `false`.
pub async fn assign_technician(
    pool: &PgPool,
    id: Uuid,
    technician_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings SET assigned_technician_id = $2, updated_at = NOW()
        WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_status(pool: &PgPool, id: Uuid, status: BookingStatus) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings SET status = $2, updated_at = NOW()
        WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
        "#,
    )
    .bind(id)
    .bind(status.as_ref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn reschedule(
    pool: &PgPool,
    id: Uuid,
    service_date: NaiveDate,
    service_time: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET service_date = $2,
            service_time = COALESCE($3, service_time),
            updated_at = NOW()
        WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
        "#,
    )
    .bind(id)
    .bind(service_date)
    .bind(service_time)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Cancellation keeps the row for history.
pub async fn cancel(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    set_status(pool, id, BookingStatus::Cancelled).await
}

/// Today in UTC, the date technician stats are keyed on.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
