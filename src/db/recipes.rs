use crate::db::{models::*, tags, DbPool};
use crate::error::{Error, Result};
use crate::search::SearchPlan;
use crate::utils::normalize_tags;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Create a new recipe and register its tags in the catalogue, both in one
/// transaction
pub async fn create_recipe(pool: &DbPool, new_recipe: &NewRecipe) -> Result<Recipe> {
    let mut tx = pool.begin().await?;
    let recipe = insert_recipe(&mut tx, new_recipe).await?;
    tx.commit().await?;

    Ok(recipe)
}

/// Insert a recipe and its tags on a connection the caller already holds
pub async fn insert_recipe(conn: &mut SqliteConnection, new_recipe: &NewRecipe) -> Result<Recipe> {
    let tags = new_recipe
        .tags
        .as_ref()
        .map(|names| normalize_tags(names.iter()));

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (
            id, user_id, name, name_search, image_url, instructions, servings,
            ingredients, tags, nutrients, rating, cooked, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_recipe.user_id)
    .bind(&new_recipe.name)
    .bind(new_recipe.name.to_lowercase())
    .bind(&new_recipe.image_url)
    .bind(Json(&new_recipe.instructions))
    .bind(new_recipe.servings.as_ref().map(Json))
    .bind(Json(&new_recipe.ingredients))
    .bind(tags.as_ref().map(Json))
    .bind(new_recipe.nutrients.as_ref().map(Json))
    .bind(new_recipe.rating)
    .bind(new_recipe.cooked)
    .bind(new_recipe.created_at.unwrap_or_else(Utc::now))
    .fetch_one(&mut *conn)
    .await?;

    if let Some(names) = &tags {
        tags::insert_missing_tags(conn, names).await?;
    }

    Ok(recipe)
}

/// Delete every recipe; collection memberships and daily picks go with them.
/// Returns how many recipes were removed.
pub async fn delete_all_recipes(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query("DELETE FROM recipes").execute(conn).await?;
    Ok(result.rows_affected())
}

/// Find recipe by ID
pub async fn find_recipe(pool: &DbPool, recipe_id: Uuid) -> Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

    Ok(recipe)
}

/// Get recipe by ID
pub async fn get_recipe(pool: &DbPool, recipe_id: Uuid) -> Result<Recipe> {
    find_recipe(pool, recipe_id)
        .await?
        .ok_or_else(|| Error::NotFound("Recipe not found".to_string()))
}

/// Run a validated search plan
pub async fn find_recipes(pool: &DbPool, plan: &SearchPlan) -> Result<Vec<Recipe>> {
    let mut query = plan.to_query();
    let recipes = query.build_query_as::<Recipe>().fetch_all(pool).await?;

    Ok(recipes)
}

/// Point a recipe at a new image
pub async fn set_image_url(pool: &DbPool, recipe_id: Uuid, image_url: &str) -> Result<Recipe> {
    let recipe =
        sqlx::query_as::<_, Recipe>("UPDATE recipes SET image_url = ? WHERE id = ? RETURNING *")
            .bind(image_url)
            .bind(recipe_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Error::NotFound("Recipe not found".to_string()))?;

    Ok(recipe)
}

/// Count total recipes
pub async fn count_recipes(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

/// Pick any recipe at random
pub async fn random_recipe_id(pool: &DbPool) -> Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM recipes ORDER BY RANDOM() LIMIT 1")
        .fetch_optional(pool)
        .await?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, run_migrations, users};
    use crate::search::FilterRequest;

    async fn setup() -> (DbPool, Uuid) {
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

        (pool, user.id)
    }

    fn soup(user_id: Uuid) -> NewRecipe {
        NewRecipe::new(
            user_id,
            "Tomato Soup",
            vec![Instruction {
                paragraph: "Simmer tomatoes".to_string(),
                timers: None,
            }],
            vec![Ingredient {
                name: "Tomato".to_string(),
                amount: 4.0,
                unit: "pcs".to_string(),
            }],
        )
    }

    #[tokio::test]
    async fn test_recipe_roundtrip() {
        let (pool, user_id) = setup().await;

        let mut new_recipe = soup(user_id);
        new_recipe.tags = Some(vec![" Vegan ".to_string(), "vegan".to_string(), "Soup".to_string()]);
        new_recipe.nutrients = Some(Nutrients {
            calories: Some(120.0),
            ..Default::default()
        });
        new_recipe.servings = Some(Servings {
            amount: Some(2),
            weight: None,
        });

        let recipe = create_recipe(&pool, &new_recipe).await.unwrap();
        assert_eq!(recipe.tag_list(), ["vegan", "soup"]);
        assert_eq!(recipe.nutrient(Nutrient::Calories), Some(120.0));
        assert_eq!(recipe.nutrient(Nutrient::Fat), None);
        assert_eq!(recipe.rating, 0.0);
        assert_eq!(recipe.cooked, 0);

        let fetched = get_recipe(&pool, recipe.id).await.unwrap();
        assert_eq!(fetched.name, "Tomato Soup");
        assert_eq!(fetched.instructions.0.len(), 1);
        assert_eq!(fetched.servings.unwrap().0.amount, Some(2));

        // Tags from the recipe land in the catalogue
        assert_eq!(tags::count_tags(&pool).await.unwrap(), 2);
        assert_eq!(count_recipes(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_comma_tags_are_searchable() {
        let (pool, user_id) = setup().await;

        let mut stew = soup(user_id);
        stew.tags = Some(vec!["Soups, Stews".to_string()]);
        let stew = create_recipe(&pool, &stew).await.unwrap();
        assert_eq!(stew.tag_list(), ["soups", "stews"]);

        let filter = FilterRequest::from_query(Some("tags=soups%2C+stews"), 20).unwrap();
        let plan = SearchPlan::from_filter(&filter, 100).unwrap();
        let found = find_recipes(&pool, &plan).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, stew.id);
    }

    #[tokio::test]
    async fn test_failed_tag_registration_rolls_back_recipe() {
        let (pool, user_id) = setup().await;
        sqlx::query("DROP TABLE tags").execute(&pool).await.unwrap();

        let mut tagged = soup(user_id);
        tagged.tags = Some(vec!["vegan".to_string()]);
        assert!(create_recipe(&pool, &tagged).await.is_err());

        assert_eq!(count_recipes(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_all_recipes() {
        let (pool, user_id) = setup().await;
        create_recipe(&pool, &soup(user_id)).await.unwrap();
        create_recipe(&pool, &soup(user_id)).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(delete_all_recipes(&mut conn).await.unwrap(), 2);
        drop(conn);
        assert_eq!(count_recipes(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_recipe() {
        let (pool, _) = setup().await;

        let result = get_recipe(&pool, Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(random_recipe_id(&pool).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_image_url() {
        let (pool, user_id) = setup().await;
        let recipe = create_recipe(&pool, &soup(user_id)).await.unwrap();

        let updated = set_image_url(&pool, recipe.id, "/media/recipes/a.png")
            .await
            .unwrap();
        assert_eq!(updated.image_url.as_deref(), Some("/media/recipes/a.png"));
    }

    #[tokio::test]
    async fn test_find_recipes_matches_unicode_names() {
        let (pool, user_id) = setup().await;

        let mut borscht = soup(user_id);
        borscht.name = "Борщ Украинский".to_string();
        create_recipe(&pool, &borscht).await.unwrap();
        create_recipe(&pool, &soup(user_id)).await.unwrap();

        let filter = FilterRequest {
            q: Some("БОРЩ".to_string()),
            ..Default::default()
        };
        let plan = SearchPlan::from_filter(&filter, 100).unwrap();
        let found = find_recipes(&pool, &plan).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Борщ Украинский");
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let (pool, user_id) = setup().await;

        let mut percent = soup(user_id);
        percent.name = "100% Rye Bread".to_string();
        create_recipe(&pool, &percent).await.unwrap();
        create_recipe(&pool, &soup(user_id)).await.unwrap();

        let filter = FilterRequest {
            q: Some("%".to_string()),
            ..Default::default()
        };
        let plan = SearchPlan::from_filter(&filter, 100).unwrap();
        let found = find_recipes(&pool, &plan).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "100% Rye Bread");
    }
}
