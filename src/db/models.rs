use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub avatar_url: Option<String>,
    pub about_me: Option<String>,
    pub is_profile_private: bool,
    pub theme_settings: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
}

/// Partial profile update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub avatar_url: Option<String>,
    pub about_me: Option<String>,
    pub is_profile_private: Option<bool>,
    pub theme_settings: Option<String>,
}

/// One step of a recipe. Timers are kept as free-form objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub paragraph: String,
    #[serde(default)]
    pub timers: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Servings {
    pub amount: Option<i64>,
    pub weight: Option<i64>,
}

/// The fixed set of nutrient keys a recipe may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Sugar,
    Protein,
    Fat,
    Carbohydrates,
}

impl Nutrient {
    pub const ALL: [Nutrient; 5] = [
        Nutrient::Calories,
        Nutrient::Sugar,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbohydrates,
    ];

    /// Key of this nutrient inside the stored nutrient map
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Sugar => "Sugar",
            Nutrient::Protein => "Protein",
            Nutrient::Fat => "Fat",
            Nutrient::Carbohydrates => "Carbohydrates",
        }
    }

    /// SQLite JSON path selecting this nutrient
    pub fn json_path(self) -> &'static str {
        match self {
            Nutrient::Calories => "$.Calories",
            Nutrient::Sugar => "$.Sugar",
            Nutrient::Protein => "$.Protein",
            Nutrient::Fat => "$.Fat",
            Nutrient::Carbohydrates => "$.Carbohydrates",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    #[serde(rename = "Calories", default)]
    pub calories: Option<f64>,
    #[serde(rename = "Sugar", default)]
    pub sugar: Option<f64>,
    #[serde(rename = "Protein", default)]
    pub protein: Option<f64>,
    #[serde(rename = "Fat", default)]
    pub fat: Option<f64>,
    #[serde(rename = "Carbohydrates", default)]
    pub carbohydrates: Option<f64>,
}

impl Nutrients {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Sugar => self.sugar,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbohydrates => self.carbohydrates,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub instructions: Json<Vec<Instruction>>,
    pub servings: Option<Json<Servings>>,
    pub ingredients: Json<Vec<Ingredient>>,
    pub tags: Option<Json<Vec<String>>>,
    pub nutrients: Option<Json<Nutrients>>,
    pub rating: f64,
    pub cooked: i64,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn tag_list(&self) -> &[String] {
        self.tags.as_ref().map(|t| t.0.as_slice()).unwrap_or(&[])
    }

    /// Value of one nutrient, `None` when the map or the key is absent
    pub fn nutrient(&self, nutrient: Nutrient) -> Option<f64> {
        self.nutrients.as_ref().and_then(|n| n.get(nutrient))
    }
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
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
    /// Defaults to now; set explicitly by imports
    pub created_at: Option<DateTime<Utc>>,
}

impl NewRecipe {
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        instructions: Vec<Instruction>,
        ingredients: Vec<Ingredient>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            image_url: None,
            instructions,
            servings: None,
            ingredients,
            tags: None,
            nutrients: None,
            rating: 0.0,
            cooked: 0,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub platform: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyRecipe {
    pub day_of_year: i64,
    pub recipe_id: Uuid,
    pub created_at: DateTime<Utc>,
}
