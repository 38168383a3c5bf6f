use crate::db::{models::*, unique_conflict, DbPool};
use crate::error::Result;
use chrono::Utc;
use uuid::Uuid;

/// Find a device token
pub async fn find_by_token(pool: &DbPool, token: &str) -> Result<Option<DeviceToken>> {
    let device = sqlx::query_as::<_, DeviceToken>("SELECT * FROM device_tokens WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    Ok(device)
}

/// Register a device token for a user
pub async fn register_device(
    pool: &DbPool,
    user_id: Uuid,
    token: &str,
    platform: &str,
) -> Result<DeviceToken> {
    let device = sqlx::query_as::<_, DeviceToken>(
        r#"
        INSERT INTO device_tokens (id, user_id, token, platform, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(token)
    .bind(platform)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| unique_conflict(e, |_| "Token already registered".to_string()))?;

    Ok(device)
}

/// Delete a token owned by `user_id`; returns false when nothing matched
pub async fn delete_device(pool: &DbPool, user_id: Uuid, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM device_tokens WHERE token = ? AND user_id = ?")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
