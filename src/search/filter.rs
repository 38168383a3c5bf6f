//! Recipe search parameters as they arrive from a client.
//!
//! Every parameter is optional. `tags` may be repeated (`tags=a&tags=b`),
//! comma-separated (`tags=a,b`) or both.

use crate::db::models::Nutrient;
use crate::error::{Error, Result};
use crate::utils::normalize_tags;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_LIMIT: i64 = 20;

/// Result ordering. Every mode sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Creation time
    #[default]
    Newest,
    /// Rating
    Rating,
    /// Times cooked
    Popularity,
}

impl SortMode {
    /// Parse a client sort value. Unrecognized values fall back to newest-first.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "new" | "newest" => SortMode::Newest,
            "rating" => SortMode::Rating,
            "popularity" => SortMode::Popularity,
            other => {
                debug!("Unknown sort mode '{}', using newest-first", other);
                SortMode::Newest
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Newest => "new",
            SortMode::Rating => "rating",
            SortMode::Popularity => "popularity",
        }
    }
}

/// Inclusive bounds on one nutrient; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NutrientRange {
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub q: Option<String>,
    /// OR semantics: a recipe matches when it carries any of these
    pub tags: Vec<String>,
    pub calories: NutrientRange,
    pub protein: NutrientRange,
    pub fat: NutrientRange,
    pub carbs: NutrientRange,
    pub sugar: NutrientRange,
    pub sort: SortMode,
    pub limit: i64,
    pub offset: i64,
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            q: None,
            tags: Vec::new(),
            calories: NutrientRange::default(),
            protein: NutrientRange::default(),
            fat: NutrientRange::default(),
            carbs: NutrientRange::default(),
            sugar: NutrientRange::default(),
            sort: SortMode::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("Invalid value for {key}: {value}")))
}

impl FilterRequest {
    /// Build a filter from a raw query string such as
    /// `q=soup&tags=vegan&calories_max=300&sort=rating&limit=10`.
    pub fn from_query(raw: Option<&str>, default_limit: i64) -> Result<Self> {
        let mut filter = FilterRequest {
            limit: default_limit,
            ..Default::default()
        };
        let mut tags: Vec<String> = Vec::new();

        let pairs = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes());
        for (key, value) in pairs {
            // Blank values behave as if the parameter were absent
            if value.trim().is_empty() {
                continue;
            }

            match key.as_ref() {
                "q" => filter.q = Some(value.into_owned()),
                "tags" | "tag" => tags.push(value.into_owned()),
                "calories_min" => filter.calories.min = Some(parse_number(&key, &value)?),
                "calories_max" => filter.calories.max = Some(parse_number(&key, &value)?),
                "protein_min" => filter.protein.min = Some(parse_number(&key, &value)?),
                "protein_max" => filter.protein.max = Some(parse_number(&key, &value)?),
                "fat_min" => filter.fat.min = Some(parse_number(&key, &value)?),
                "fat_max" => filter.fat.max = Some(parse_number(&key, &value)?),
                "carbs_min" => filter.carbs.min = Some(parse_number(&key, &value)?),
                "carbs_max" => filter.carbs.max = Some(parse_number(&key, &value)?),
                "sugar_min" => filter.sugar.min = Some(parse_number(&key, &value)?),
                "sugar_max" => filter.sugar.max = Some(parse_number(&key, &value)?),
                "sort" => filter.sort = SortMode::parse(&value),
                "limit" => filter.limit = parse_number(&key, &value)?,
                "offset" => filter.offset = parse_number(&key, &value)?,
                other => debug!("Ignoring unknown search parameter '{}'", other),
            }
        }

        filter.tags = normalize_tags(tags);
        Ok(filter)
    }

    /// Each request range paired with the nutrient key it constrains
    pub fn nutrient_ranges(&self) -> [(Nutrient, NutrientRange); 5] {
        [
            (Nutrient::Calories, self.calories),
            (Nutrient::Protein, self.protein),
            (Nutrient::Fat, self.fat),
            (Nutrient::Carbohydrates, self.carbs),
            (Nutrient::Sugar, self.sugar),
        ]
    }

    /// Reject out-of-range pagination and non-finite bounds
    pub fn validate(&self, max_limit: i64) -> Result<()> {
        if self.limit < 0 || self.limit > max_limit {
            return Err(Error::Validation(format!(
                "limit must be between 0 and {max_limit}"
            )));
        }

        if self.offset < 0 {
            return Err(Error::Validation("offset must not be negative".to_string()));
        }

        for (nutrient, range) in self.nutrient_ranges() {
            for bound in [range.min, range.max].into_iter().flatten() {
                if !bound.is_finite() {
                    return Err(Error::Validation(format!(
                        "{} bounds must be finite numbers",
                        nutrient.key()
                    )));
                }
            }
        }

        Ok(())
    }
}
