use crate::db::{models::*, recipes, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use tracing::info;

async fn find_daily(pool: &DbPool, day_of_year: i64) -> Result<Option<DailyRecipe>> {
    let daily = sqlx::query_as::<_, DailyRecipe>("SELECT * FROM daily_recipe WHERE day_of_year = ?")
        .bind(day_of_year)
        .fetch_optional(pool)
        .await?;

    Ok(daily)
}

/// Recipe of the day. The first call for a day picks a random recipe;
/// later calls return the same pick. `None` when there are no recipes.
pub async fn get_or_pick_daily(
    pool: &DbPool,
    day_of_year: i64,
) -> Result<Option<(DailyRecipe, Recipe)>> {
    if !(1..=366).contains(&day_of_year) {
        return Err(Error::Validation(format!(
            "day_of_year must be between 1 and 366, got {day_of_year}"
        )));
    }

    if find_daily(pool, day_of_year).await?.is_none() {
        let Some(recipe_id) = recipes::random_recipe_id(pool).await? else {
            return Ok(None);
        };

        // A concurrent pick for the same day wins; re-read below
        let result = sqlx::query(
            "INSERT OR IGNORE INTO daily_recipe (day_of_year, recipe_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(day_of_year)
        .bind(recipe_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!("Picked recipe {} for day {}", recipe_id, day_of_year);
        }
    }

    let Some(daily) = find_daily(pool, day_of_year).await? else {
        return Ok(None);
    };
    let recipe = recipes::get_recipe(pool, daily.recipe_id).await?;

    Ok(Some((daily, recipe)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, run_migrations, users};

    #[tokio::test]
    async fn test_daily_pick_is_stable() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert!(get_or_pick_daily(&pool, 42).await.unwrap().is_none());

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
        for name in ["Soup", "Salad", "Stew"] {
            recipes::create_recipe(&pool, &NewRecipe::new(user.id, name, vec![], vec![]))
                .await
                .unwrap();
        }

        let (first, recipe) = get_or_pick_daily(&pool, 42).await.unwrap().unwrap();
        assert_eq!(first.day_of_year, 42);
        assert_eq!(first.recipe_id, recipe.id);

        for _ in 0..5 {
            let (again, _) = get_or_pick_daily(&pool, 42).await.unwrap().unwrap();
            assert_eq!(again.recipe_id, first.recipe_id);
        }

        assert!(matches!(
            get_or_pick_daily(&pool, 0).await,
            Err(Error::Validation(_))
        ));
    }
}
