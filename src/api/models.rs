use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{
    Collection, DeviceToken, Ingredient, Instruction, Nutrients, Recipe, Servings, Tag, User,
};

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// JSON login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password form; `username` carries the email
#[derive(Debug, Clone, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Public user profile
#[derive(Debug, Clone, Serialize)]
pub struct UserRead {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub avatar_url: Option<String>,
    pub about_me: Option<String>,
    pub is_profile_private: bool,
    pub theme_settings: String,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            avatar_url: user.avatar_url,
            about_me: user.about_me,
            is_profile_private: user.is_profile_private,
            theme_settings: user.theme_settings,
        }
    }
}

/// Recipe creation request
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub servings: Option<Servings>,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub nutrients: Option<Nutrients>,
}

/// Full recipe as returned by every recipe endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRead {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub instructions: Vec<Instruction>,
    pub servings: Option<Servings>,
    pub ingredients: Vec<Ingredient>,
    pub tags: Option<Vec<String>>,
    pub nutrients: Option<Nutrients>,
    pub rating: f64,
    pub cooked: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeRead {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            user_id: recipe.user_id,
            name: recipe.name,
            image_url: recipe.image_url,
            instructions: recipe.instructions.0,
            servings: recipe.servings.map(|s| s.0),
            ingredients: recipe.ingredients.0,
            tags: recipe.tags.map(|t| t.0),
            nutrients: recipe.nutrients.map(|n| n.0),
            rating: recipe.rating,
            cooked: recipe.cooked,
            created_at: recipe.created_at,
        }
    }
}

pub fn recipe_list(recipes: Vec<Recipe>) -> Vec<RecipeRead> {
    recipes.into_iter().map(RecipeRead::from).collect()
}

/// Query parameters for the top and latest listings
#[derive(Debug, Clone, Deserialize)]
pub struct ListingParams {
    #[serde(default = "default_listing_limit")]
    pub limit: i64,
}

/// Query parameters for the low-calorie listing
#[derive(Debug, Clone, Deserialize)]
pub struct LowCalorieParams {
    #[serde(default = "default_max_calories")]
    pub max_calories: f64,
    #[serde(default = "default_listing_limit")]
    pub limit: i64,
}

fn default_listing_limit() -> i64 {
    10
}

fn default_max_calories() -> f64 {
    100.0
}

/// Today's recipe
#[derive(Debug, Clone, Serialize)]
pub struct DailyRecipeResponse {
    pub day_of_year: i64,
    pub recipe: RecipeRead,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionCreate {
    pub name: String,
}

/// Collection with its recipe IDs
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRead {
    pub id: Uuid,
    pub name: String,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub recipe_ids: Vec<Uuid>,
}

impl CollectionRead {
    pub fn new(collection: Collection, picture_url: Option<String>, recipe_ids: Vec<Uuid>) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            picture_url,
            created_at: collection.created_at,
            recipe_ids,
        }
    }
}

/// Collection without its recipe list
#[derive(Debug, Clone, Serialize)]
pub struct CollectionBrief {
    pub id: Uuid,
    pub name: String,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagRead {
    pub id: Uuid,
    pub name: String,
}

impl From<Tag> for TagRead {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRegister {
    pub token: String,
    pub platform: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceRead {
    pub id: Uuid,
    pub token: String,
    pub platform: String,
    pub created_at: DateTime<Utc>,
}

impl From<DeviceToken> for DeviceRead {
    fn from(device: DeviceToken) -> Self {
        Self {
            id: device.id,
            token: device.token,
            platform: device.platform,
            created_at: device.created_at,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: String,
}
