#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use feedandeat::config::{
    AuthConfig, DatabaseConfig, MediaConfig, PaginationConfig, ServerConfig, Settings,
};
use feedandeat::db::models::{Ingredient, Instruction, NewRecipe, NewUser, Nutrients, User};
use feedandeat::db::{self, DbPool};
use std::path::Path;

pub async fn memory_pool() -> DbPool {
    let pool = db::init_pool("sqlite::memory:").await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

pub fn test_settings(media_dir: &Path) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            external_url: None,
            api_rate_limit: 100,
            max_request_body_size: 10485760,
        },
        auth: AuthConfig {
            secret_key: "integration-secret".to_string(),
            access_token_expire_minutes: 60,
            bcrypt_cost: 4,
        },
        media: MediaConfig {
            media_dir: media_dir.to_path_buf(),
            media_url: "/media".to_string(),
            max_upload_size: 1024,
        },
        pagination: PaginationConfig {
            api_max_limit: 100,
            default_limit: 20,
        },
    }
}

pub async fn seed_user(pool: &DbPool, username: &str) -> User {
    db::users::create_user(
        pool,
        &NewUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            hashed_password: "$2b$04$hash".to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn recipe(user: &User, name: &str) -> NewRecipe {
    NewRecipe::new(
        user.id,
        name,
        vec![Instruction {
            paragraph: format!("Cook the {name}"),
            timers: None,
        }],
        vec![Ingredient {
            name: "Salt".to_string(),
            amount: 1.0,
            unit: "pinch".to_string(),
        }],
    )
}

/// Thirty recipes with a spread of tags, nutrients, ratings, cook counts and
/// creation times. Recipe `i` is created `i` minutes after [`base_time`].
pub async fn seed_catalogue(pool: &DbPool, user: &User) {
    for i in 0..30i64 {
        let name = if i % 5 == 0 {
            format!("Soup {i}")
        } else {
            format!("Dish {i}")
        };

        let mut new_recipe = recipe(user, &name);
        new_recipe.tags = match i % 3 {
            0 => Some(vec!["vegan".to_string()]),
            1 => Some(vec!["Quick".to_string(), "dinner".to_string()]),
            _ => None,
        };
        new_recipe.nutrients = if i % 4 == 0 {
            None
        } else {
            Some(Nutrients {
                calories: Some((i * 25) as f64),
                protein: if i % 2 == 0 { Some(i as f64) } else { None },
                carbohydrates: Some((30 - i) as f64),
                ..Default::default()
            })
        };
        new_recipe.rating = ((i * 7) % 10) as f64 / 2.0;
        new_recipe.cooked = (i * 13) % 17;
        new_recipe.created_at = Some(base_time() + Duration::minutes(i));

        db::recipes::create_recipe(pool, &new_recipe).await.unwrap();
    }
}
