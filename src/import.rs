//! Bulk loading of recipe and tag dumps from JSON files.

use crate::auth::hash_password;
use crate::db::models::{Ingredient, Instruction, NewRecipe, NewUser, Nutrients, Servings};
use crate::db::{recipes, tags, users, DbPool};
use crate::error::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const PROGRESS_EVERY: usize = 500;

/// One recipe as it appears in an import file
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeSeed {
    pub name: String,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub servings: Option<Servings>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nutrients: Option<Nutrients>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub cooked: i64,
}

/// Owner of imported recipes
#[derive(Debug, Clone)]
pub struct SystemUser {
    pub email: String,
    pub username: String,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Give every timer an `id` and snake_case copies of its limit fields.
/// Existing keys are never overwritten.
pub fn normalize_timers(instructions: &mut [Instruction]) {
    for timer in instructions
        .iter_mut()
        .filter_map(|i| i.timers.as_mut())
        .flatten()
    {
        if !timer.contains_key("id") {
            timer.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        for (camel, snake) in [("lowerLimit", "lower_limit"), ("upperLimit", "upper_limit")] {
            if let Some(value) = timer.get(camel).cloned() {
                timer.entry(snake.to_string()).or_insert(value);
            }
        }
    }
}

/// Import recipes from a JSON array, owned by the system user. With
/// `replace`, every existing recipe is deleted first. The whole import is one
/// transaction. Returns the number of recipes inserted.
pub async fn import_recipes(
    pool: &DbPool,
    path: &Path,
    system: &SystemUser,
    bcrypt_cost: u32,
    replace: bool,
) -> Result<usize> {
    let seeds: Vec<RecipeSeed> = load_json(path)?;
    info!("Importing {} recipes from {}", seeds.len(), path.display());

    // Nobody can log in as the system user; its password is never revealed
    let (owner, created) = users::get_or_create_user(
        pool,
        &NewUser {
            email: system.email.clone(),
            username: system.username.clone(),
            hashed_password: hash_password(&Uuid::new_v4().to_string(), bcrypt_cost)?,
        },
    )
    .await?;
    if created {
        info!("Created system user {}", owner.email);
    }

    let mut tx = pool.begin().await?;
    if replace {
        let removed = recipes::delete_all_recipes(&mut tx).await?;
        info!("Removed {} existing recipes", removed);
    }

    let mut inserted = 0;
    for seed in seeds {
        let mut instructions = seed.instructions;
        normalize_timers(&mut instructions);

        let mut new_recipe = NewRecipe::new(owner.id, seed.name, instructions, seed.ingredients);
        new_recipe.image_url = seed.image;
        new_recipe.servings = seed.servings;
        new_recipe.tags = Some(seed.tags);
        new_recipe.nutrients = seed.nutrients;
        new_recipe.rating = seed.rating;
        new_recipe.cooked = seed.cooked;

        recipes::insert_recipe(&mut tx, &new_recipe).await?;
        inserted += 1;

        if inserted % PROGRESS_EVERY == 0 {
            info!("Inserted {} recipes", inserted);
        }
    }

    tx.commit().await?;
    info!("Done, inserted {} recipes", inserted);
    Ok(inserted)
}

/// Import a JSON array of tag names. Returns how many were new.
pub async fn import_tags(pool: &DbPool, path: &Path) -> Result<u64> {
    let names: Vec<String> = load_json(path)?;
    let added = tags::ensure_tags(pool, &names).await?;
    info!("Added {} of {} tags", added, names.len());
    Ok(added)
}
