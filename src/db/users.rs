use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::user::{AdminUser, Customer, FieldTechnician};

fn customer_from_row(r: &PgRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: r.try_get("id")?,
        email: r.try_get("email")?,
        name: r.try_get("name")?,
        phone: r.try_get("phone")?,
        verified: r.try_get("verified")?,
        created_at: r.try_get("created_at")?,
        password_hash: r.try_get("password_hash")?,
    })
}

fn technician_from_row(r: &PgRow) -> Result<FieldTechnician, sqlx::Error> {
    Ok(FieldTechnician {
        id: r.try_get("id")?,
        email: r.try_get("email")?,
        name: r.try_get("name")?,
        phone: r.try_get("phone")?,
        employee_id: r.try_get("employee_id")?,
        active: r.try_get("active")?,
        created_at: r.try_get("created_at")?,
        password_hash: r.try_get("password_hash")?,
    })
}

fn admin_from_row(r: &PgRow) -> Result<AdminUser, sqlx::Error> {
    Ok(AdminUser {
        id: r.try_get("id")?,
        email: r.try_get("email")?,
        name: r.try_get("name")?,
        title: r.try_get("title")?,
        created_at: r.try_get("created_at")?,
        password_hash: r.try_get("password_hash")?,
    })
}

// ── Customers ───────────────────────────────────────────────────────

pub async fn create_customer(
    pool: &PgPool,
    email: &str,
    name: &str,
    phone: &str,
    password_hash: &str,
) -> Result<Customer, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO customers (email, name, phone, password_hash)
        VALUES (LOWER($1), $2, $3, $4)
        RETURNING id, email, name, phone, verified, created_at, password_hash
        "#,
    )
    .bind(email.trim())
    .bind(name)
    .bind(phone)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    customer_from_row(&row)
}

pub async fn find_customer_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, name, phone, verified, created_at, password_hash
        FROM customers
        WHERE email = LOWER($1)
        "#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?
    .map(|r| customer_from_row(&r))
    .transpose()
}

pub async fn get_customer(pool: &PgPool, id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, name, phone, verified, created_at, password_hash
        FROM customers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|r| customer_from_row(&r))
    .transpose()
}

/// Returns false when no customer has that email.
pub async fn mark_customer_verified(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE customers SET verified = TRUE WHERE email = LOWER($1)")
        .bind(email.trim())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_customers(pool: &PgPool) -> Result<Vec<Customer>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, email, name, phone, verified, created_at, password_hash
        FROM customers
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(customer_from_row).collect()
}

// ── Field technicians ───────────────────────────────────────────────

pub async fn create_technician(
    pool: &PgPool,
    email: &str,
    name: &str,
    phone: &str,
    employee_id: &str,
    password_hash: &str,
) -> Result<FieldTechnician, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO field_technicians (email, name, phone, employee_id, password_hash)
        VALUES (LOWER($1), $2, $3, $4, $5)
        RETURNING id, email, name, phone, employee_id, active, created_at, password_hash
        "#,
    )
    .bind(email.trim())
    .bind(name)
    .bind(phone)
    .bind(employee_id)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    technician_from_row(&row)
}

pub async fn find_technician_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<FieldTechnician>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, name, phone, employee_id, active, created_at, password_hash
        FROM field_technicians
        WHERE email = LOWER($1)
        "#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?
    .map(|r| technician_from_row(&r))
    .transpose()
}

pub async fn get_technician(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<FieldTechnician>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, name, phone, employee_id, active, created_at, password_hash
        FROM field_technicians
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|r| technician_from_row(&r))
    .transpose()
}

pub async fn list_technicians(pool: &PgPool) -> Result<Vec<FieldTechnician>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, email, name, phone, employee_id, active, created_at, password_hash
        FROM field_technicians
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(technician_from_row).collect()
}

// ── Admins ──────────────────────────────────────────────────────────

pub async fn create_admin(
    pool: &PgPool,
    email: &str,
    name: &str,
    title: &str,
    password_hash: &str,
) -> Result<AdminUser, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO admins (email, name, title, password_hash)
        VALUES (LOWER($1), $2, $3, $4)
        RETURNING id, email, name, title, created_at, password_hash
        "#,
    )
    .bind(email.trim())
    .bind(name)
    .bind(title)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    admin_from_row(&row)
}

pub async fn find_admin_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<AdminUser>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, name, title, created_at, password_hash
        FROM admins
        WHERE email = LOWER($1)
        "#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?
    .map(|r| admin_from_row(&r))
    .transpose()
}

pub async fn get_admin(pool: &PgPool, id: Uuid) -> Result<Option<AdminUser>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, email, name, title, created_at, password_hash
        FROM admins
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(|r| admin_from_row(&r))
    .transpose()
}

pub async fn count_admins(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM admins")
        .fetch_one(pool)
        .await?;
    row.try_get("n")
}
