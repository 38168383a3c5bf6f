use crate::db::models::Nutrient;
use crate::error::Result;
use crate::search::filter::{FilterRequest, SortMode};
use crate::utils::escape_like;
use sqlx::{QueryBuilder, Sqlite};

/// One constraint on the recipe table. A plan ANDs all of its predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Lowercased substring of the recipe name
    NameContains(String),
    /// Recipe carries at least one of these tags
    AnyTag(Vec<String>),
    NutrientAtLeast(Nutrient, f64),
    NutrientAtMost(Nutrient, f64),
}

impl Predicate {
    fn push_sql(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            Predicate::NameContains(needle) => {
                qb.push("recipes.name_search LIKE ");
                qb.push_bind(format!("%{}%", escape_like(needle)));
                qb.push(" ESCAPE '\\'");
            }
            Predicate::AnyTag(tags) => {
                qb.push(
                    "EXISTS (SELECT 1 FROM json_each(recipes.tags) WHERE json_each.value IN (",
                );
                let mut separated = qb.separated(", ");
                for tag in tags {
                    separated.push_bind(tag.clone());
                }
                qb.push("))");
            }
            // json_extract yields NULL for a missing key, and NULL never
            // satisfies a comparison
            Predicate::NutrientAtLeast(nutrient, bound) => {
                qb.push(format!(
                    "json_extract(recipes.nutrients, '{}') >= ",
                    nutrient.json_path()
                ));
                qb.push_bind(*bound);
            }
            Predicate::NutrientAtMost(nutrient, bound) => {
                qb.push(format!(
                    "json_extract(recipes.nutrients, '{}') <= ",
                    nutrient.json_path()
                ));
                qb.push_bind(*bound);
            }
        }
    }

    /// Evaluate the predicate against a loaded recipe
    pub fn matches(&self, recipe: &crate::db::models::Recipe) -> bool {
        match self {
            Predicate::NameContains(needle) => recipe.name.to_lowercase().contains(needle),
            Predicate::AnyTag(tags) => recipe.tag_list().iter().any(|t| tags.contains(t)),
            Predicate::NutrientAtLeast(nutrient, bound) => recipe
                .nutrient(*nutrient)
                .is_some_and(|value| value >= *bound),
            Predicate::NutrientAtMost(nutrient, bound) => recipe
                .nutrient(*nutrient)
                .is_some_and(|value| value <= *bound),
        }
    }
}

/// Translate the optional filters into the predicates they activate
pub fn build_predicates(filter: &FilterRequest) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(q) = filter.q.as_deref() {
        let needle = q.trim().to_lowercase();
        if !needle.is_empty() {
            predicates.push(Predicate::NameContains(needle));
        }
    }

    if !filter.tags.is_empty() {
        predicates.push(Predicate::AnyTag(filter.tags.clone()));
    }

    for (nutrient, range) in filter.nutrient_ranges() {
        if let Some(min) = range.min {
            predicates.push(Predicate::NutrientAtLeast(nutrient, min));
        }
        if let Some(max) = range.max {
            predicates.push(Predicate::NutrientAtMost(nutrient, max));
        }
    }

    predicates
}

fn order_by(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Newest => "recipes.created_at DESC, recipes.rowid DESC",
        SortMode::Rating => "recipes.rating DESC, recipes.created_at DESC, recipes.rowid DESC",
        SortMode::Popularity => {
            "recipes.cooked DESC, recipes.created_at DESC, recipes.rowid DESC"
        }
    }
}

/// A validated search, ready to be rendered into SQL
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub predicates: Vec<Predicate>,
    pub sort: SortMode,
    pub limit: i64,
    pub offset: i64,
}

impl SearchPlan {
    /// Validate the request and collect its predicates
    pub fn from_filter(filter: &FilterRequest, max_limit: i64) -> Result<Self> {
        filter.validate(max_limit)?;

        Ok(Self {
            predicates: build_predicates(filter),
            sort: filter.sort,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Render the plan as a single `SELECT` with bound parameters
    pub fn to_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT recipes.* FROM recipes");

        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(&mut qb);
        }

        qb.push(" ORDER BY ");
        qb.push(order_by(self.sort));
        qb.push(" LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.offset);

        qb
    }
}
