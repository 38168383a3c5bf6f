use crate::db::{models::*, unique_conflict, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Create a new user. A taken email or username is a conflict.
pub async fn create_user(pool: &DbPool, new_user: &NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, username, hashed_password, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.hashed_password)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        unique_conflict(e, |message| {
            if message.contains("users.username") {
                "Username already taken".to_string()
            } else {
                "Email already registered".to_string()
            }
        })
    })?;

    Ok(user)
}

/// Find user by ID
pub async fn find_user(pool: &DbPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Get user by ID
pub async fn get_user(pool: &DbPool, user_id: Uuid) -> Result<User> {
    find_user(pool, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

/// Find user by email
pub async fn find_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Check whether an email is already registered
pub async fn email_exists(pool: &DbPool, email: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Check whether a username is already taken
pub async fn username_exists(pool: &DbPool, username: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Apply a partial profile update
pub async fn update_profile(pool: &DbPool, user_id: Uuid, update: &UpdateProfile) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET avatar_url = COALESCE(?, avatar_url),
            about_me = COALESCE(?, about_me),
            is_profile_private = COALESCE(?, is_profile_private),
            theme_settings = COALESCE(?, theme_settings)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&update.avatar_url)
    .bind(&update.about_me)
    .bind(update.is_profile_private)
    .bind(&update.theme_settings)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(user)
}

/// Set the avatar URL
pub async fn set_avatar_url(pool: &DbPool, user_id: Uuid, avatar_url: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>("UPDATE users SET avatar_url = ? WHERE id = ? RETURNING *")
        .bind(avatar_url)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    Ok(user)
}

/// Get a user by email, creating it when missing. Returns the user and
/// whether it was created.
pub async fn get_or_create_user(pool: &DbPool, new_user: &NewUser) -> Result<(User, bool)> {
    if let Some(user) = find_user_by_email(pool, &new_user.email).await? {
        Ok((user, false))
    } else {
        let user = create_user(pool, new_user).await?;
        Ok((user, true))
    }
}
