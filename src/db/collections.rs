use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use uuid::Uuid;

/// Create a new collection
pub async fn create_collection(pool: &DbPool, owner_id: Uuid, name: &str) -> Result<Collection> {
    let collection = sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (id, owner_id, name, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(collection)
}

/// Get collection by ID
pub async fn get_collection(pool: &DbPool, collection_id: Uuid) -> Result<Collection> {
    let collection = sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = ?")
        .bind(collection_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Collection not found".to_string()))?;

    Ok(collection)
}

/// Collections owned by a user, newest first
pub async fn list_user_collections(pool: &DbPool, owner_id: Uuid) -> Result<Vec<Collection>> {
    let collections = sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(collections)
}

/// Recipe IDs in a collection, in the order they were added
pub async fn recipe_ids(pool: &DbPool, collection_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT recipe_id
        FROM collection_recipes
        WHERE collection_id = ?
        ORDER BY added_at, rowid
        "#,
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Image of the most recently added recipe that has one
pub async fn last_recipe_image(pool: &DbPool, collection_id: Uuid) -> Result<Option<String>> {
    let image = sqlx::query_scalar::<_, String>(
        r#"
        SELECT r.image_url
        FROM collection_recipes cr
        JOIN recipes r ON r.id = cr.recipe_id
        WHERE cr.collection_id = ? AND r.image_url IS NOT NULL
        ORDER BY cr.added_at DESC, cr.rowid DESC
        LIMIT 1
        "#,
    )
    .bind(collection_id)
    .fetch_optional(pool)
    .await?;

    Ok(image)
}

/// Full recipes in a collection, in the order they were added
pub async fn list_collection_recipes(pool: &DbPool, collection_id: Uuid) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT r.*
        FROM recipes r
        JOIN collection_recipes cr ON cr.recipe_id = r.id
        WHERE cr.collection_id = ?
        ORDER BY cr.added_at, cr.rowid
        "#,
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Add a recipe; returns false when it was already present
pub async fn add_recipe(pool: &DbPool, collection_id: Uuid, recipe_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO collection_recipes (collection_id, recipe_id, added_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(collection_id)
    .bind(recipe_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a recipe; returns false when it was not present
pub async fn remove_recipe(pool: &DbPool, collection_id: Uuid, recipe_id: Uuid) -> Result<bool> {
    let result =
        sqlx::query("DELETE FROM collection_recipes WHERE collection_id = ? AND recipe_id = ?")
            .bind(collection_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the collection picture
pub async fn set_picture_url(
    pool: &DbPool,
    collection_id: Uuid,
    picture_url: &str,
) -> Result<Collection> {
    let collection = sqlx::query_as::<_, Collection>(
        "UPDATE collections SET picture_url = ? WHERE id = ? RETURNING *",
    )
    .bind(picture_url)
    .bind(collection_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound("Collection not found".to_string()))?;

    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, recipes, run_migrations, users};

    #[tokio::test]
    async fn test_collection_membership() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user = users::create_user(
            &pool,
            &NewUser {
                email: "chef@example.com".to_string(),
                username: "chef".to_string(),
                hashed_password: "$2b$04$hash".to_string(),
            },
        )
        .await
        .unwrap();

        let mut pancakes = NewRecipe::new(user.id, "Pancakes", vec![], vec![]);
        pancakes.image_url = Some("/media/recipes/pancakes.png".to_string());
        let pancakes = recipes::create_recipe(&pool, &pancakes).await.unwrap();
        let salad = recipes::create_recipe(&pool, &NewRecipe::new(user.id, "Salad", vec![], vec![]))
            .await
            .unwrap();

        let collection = create_collection(&pool, user.id, "Breakfast").await.unwrap();
        assert!(collection.picture_url.is_none());
        assert!(last_recipe_image(&pool, collection.id).await.unwrap().is_none());

        assert!(add_recipe(&pool, collection.id, pancakes.id).await.unwrap());
        assert!(!add_recipe(&pool, collection.id, pancakes.id).await.unwrap());
        assert!(add_recipe(&pool, collection.id, salad.id).await.unwrap());

        assert_eq!(
            recipe_ids(&pool, collection.id).await.unwrap(),
            vec![pancakes.id, salad.id]
        );
        // Salad has no image, so the fallback skips it
        assert_eq!(
            last_recipe_image(&pool, collection.id).await.unwrap().as_deref(),
            Some("/media/recipes/pancakes.png")
        );

        let listed = list_collection_recipes(&pool, collection.id).await.unwrap();
        assert_eq!(listed.len(), 2);

        assert!(remove_recipe(&pool, collection.id, pancakes.id).await.unwrap());
        assert!(!remove_recipe(&pool, collection.id, pancakes.id).await.unwrap());
        assert_eq!(recipe_ids(&pool, collection.id).await.unwrap(), vec![salad.id]);

        let mine = list_user_collections(&pool, user.id).await.unwrap();
        assert_eq!(mine.len(), 1);

        let updated = set_picture_url(&pool, collection.id, "/media/collections/c.png")
            .await
            .unwrap();
        assert_eq!(updated.picture_url.as_deref(), Some("/media/collections/c.png"));
    }
}
