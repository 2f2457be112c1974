use sqlx::PgPool;
use uuid::Uuid;

use crate::models::address::{Address, AddressInput};

const COLUMNS: &str = "id, user_id, name, address_line, landmark, lat, lng, created_at";

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: &AddressInput,
) -> Result<Address, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        r#"
        INSERT INTO addresses (user_id, name, address_line, landmark, lat, lng)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.address_line)
    .bind(&input.landmark)
    .bind(input.lat)
    .bind(input.lng)
    .fetch_one(pool)
    .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        "SELECT {COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY created_at ASC LIMIT 100"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Only returns the address when it belongs to `user_id`.
pub async fn get_for_user(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        "SELECT {COLUMNS} FROM addresses WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!("SELECT {COLUMNS} FROM addresses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        "SELECT {COLUMNS} FROM addresses WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    input: &AddressInput,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as::<_, Address>(&format!(
        r#"
        UPDATE addresses
        SET name = $3, address_line = $4, landmark = $5, lat = $6, lng = $7
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.address_line)
    .bind(&input.landmark)
    .bind(input.lat)
    .bind(input.lng)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
