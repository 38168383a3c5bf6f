use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use crate::utils::{normalize_tag, normalize_tags, TAG_SEPARATOR};
use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Get or create a tag by name. Names are stored normalized, so lookups are
/// case-insensitive.
pub async fn get_or_create_tag(pool: &DbPool, name: &str) -> Result<Tag> {
    let name = normalize_tag(name)
        .ok_or_else(|| Error::Validation("Tag name must not be empty".to_string()))?;
    if name.contains(TAG_SEPARATOR) {
        return Err(Error::Validation(format!(
            "Tag name must not contain '{TAG_SEPARATOR}'"
        )));
    }

    sqlx::query("INSERT OR IGNORE INTO tags (id, name, created_at) VALUES (?, ?, ?)")
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ?")
        .bind(&name)
        .fetch_one(pool)
        .await?;

    Ok(tag)
}

/// Register every name that is not in the catalogue yet; returns how many
/// were added
pub async fn ensure_tags<S: AsRef<str>>(pool: &DbPool, names: &[S]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let added = insert_missing_tags(&mut tx, names).await?;
    tx.commit().await?;

    Ok(added)
}

/// Same as [`ensure_tags`], on a connection the caller already holds
pub async fn insert_missing_tags<S: AsRef<str>>(
    conn: &mut SqliteConnection,
    names: &[S],
) -> Result<u64> {
    let mut added = 0;
    let now = Utc::now();

    for name in normalize_tags(names) {
        let result = sqlx::query("INSERT OR IGNORE INTO tags (id, name, created_at) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4())
            .bind(&name)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        added += result.rows_affected();
    }

    Ok(added)
}

/// All tags ordered by name
pub async fn list_tags(pool: &DbPool) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(tags)
}

/// Count total tags
pub async fn count_tags(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}
