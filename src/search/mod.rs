pub mod filter;
pub mod predicate;

pub use filter::{FilterRequest, NutrientRange, SortMode, DEFAULT_LIMIT};
pub use predicate::{build_predicates, Predicate, SearchPlan};

use crate::db::{models::Recipe, recipes, DbPool};
use crate::error::Result;
use tracing::debug;

/// Validate a filter request and run it against the recipe store
pub async fn search_recipes(
    pool: &DbPool,
    filter: &FilterRequest,
    max_limit: i64,
) -> Result<Vec<Recipe>> {
    let plan = SearchPlan::from_filter(filter, max_limit)?;
    debug!(
        "Searching recipes with {} predicates, sort={}, limit={}, offset={}",
        plan.predicates.len(),
        plan.sort.as_str(),
        plan.limit,
        plan.offset
    );

    recipes::find_recipes(pool, &plan).await
}
