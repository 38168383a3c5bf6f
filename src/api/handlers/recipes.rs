use axum::{
    extract::{rejection::QueryRejection, Multipart, Path, Query, RawQuery, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use tracing::debug;
use uuid::Uuid;

use super::AppState;
use crate::{
    api::models::*,
    auth::AuthUser,
    db::{self, models::NewRecipe},
    media::{self, MediaKind},
    search::{self, FilterRequest, NutrientRange, SortMode},
    utils::validation::validate_text,
    Error, Result,
};

/// Run a filter against the store with the configured page cap
async fn run_search(state: &AppState, filter: &FilterRequest) -> Result<Json<Vec<RecipeRead>>> {
    let recipes = search::search_recipes(
        &state.pool,
        filter,
        state.settings.pagination.api_max_limit,
    )
    .await?;

    Ok(Json(recipe_list(recipes)))
}

/// POST /recipes - Create a recipe owned by the caller
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<RecipeCreate>,
) -> Result<(StatusCode, Json<RecipeRead>)> {
    debug!("Create recipe request: {}", req.name);

    let name = validate_text("Name", &req.name, 255)?;
    let mut new_recipe = NewRecipe::new(user.id, name, req.instructions, req.ingredients);
    new_recipe.image_url = req.image_url;
    new_recipe.servings = req.servings;
    new_recipe.tags = req.tags;
    new_recipe.nutrients = req.nutrients;

    let recipe = db::recipes::create_recipe(&state.pool, &new_recipe).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// GET /recipes/search - Filtered, sorted, paginated search
pub async fn search_recipes(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<RecipeRead>>> {
    debug!("Search request: {:?}", raw);

    let filter = FilterRequest::from_query(
        raw.as_deref(),
        state.settings.pagination.default_limit,
    )?;
    run_search(&state, &filter).await
}

/// GET /recipes/top - Highest rated
pub async fn top_recipes(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<Vec<RecipeRead>>> {
    let Query(params) = params?;
    debug!("Top recipes request: {:?}", params);

    let filter = FilterRequest {
        sort: SortMode::Rating,
        limit: params.limit,
        ..Default::default()
    };
    run_search(&state, &filter).await
}

/// GET /recipes/latest - Newest first
pub async fn latest_recipes(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<Vec<RecipeRead>>> {
    let Query(params) = params?;
    debug!("Latest recipes request: {:?}", params);

    let filter = FilterRequest {
        sort: SortMode::Newest,
        limit: params.limit,
        ..Default::default()
    };
    run_search(&state, &filter).await
}

/// GET /recipes/low_calorie - Most cooked recipes under a calorie cap
pub async fn low_calorie_recipes(
    State(state): State<AppState>,
    params: std::result::Result<Query<LowCalorieParams>, QueryRejection>,
) -> Result<Json<Vec<RecipeRead>>> {
    let Query(params) = params?;
    debug!("Low calorie recipes request: {:?}", params);

    let filter = FilterRequest {
        calories: NutrientRange {
            min: None,
            max: Some(params.max_calories),
        },
        sort: SortMode::Popularity,
        limit: params.limit,
        ..Default::default()
    };
    run_search(&state, &filter).await
}

/// GET /recipes/daily - Recipe of the day
pub async fn daily_recipe(State(state): State<AppState>) -> Result<Json<DailyRecipeResponse>> {
    let day_of_year = i64::from(Utc::now().ordinal());
    debug!("Daily recipe request for day {}", day_of_year);

    let (daily, recipe) = db::daily::get_or_pick_daily(&state.pool, day_of_year)
        .await?
        .ok_or_else(|| Error::NotFound("No recipes available".to_string()))?;

    Ok(Json(DailyRecipeResponse {
        day_of_year: daily.day_of_year,
        recipe: recipe.into(),
    }))
}

/// GET /recipes/:id - Get recipe details
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeRead>> {
    debug!("Get recipe request: {}", id);

    let recipe = db::recipes::get_recipe(&state.pool, id).await?;
    Ok(Json(recipe.into()))
}

/// POST /recipes/:id/image - Replace the recipe image
pub async fn upload_recipe_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<RecipeRead>> {
    debug!("Upload recipe image request: {}", id);

    let recipe = db::recipes::get_recipe(&state.pool, id).await?;
    if recipe.user_id != user.id {
        return Err(Error::Forbidden("Not allowed".to_string()));
    }

    let media_config = &state.settings.media;
    let upload = media::read_image_field(&mut multipart, media_config.max_upload_size).await?;
    let image_url = media::save_image(media_config, MediaKind::Recipes, &upload).await?;

    let updated = media::replace_image(
        media_config,
        recipe.image_url.as_deref(),
        &image_url,
        db::recipes::set_image_url(&state.pool, id, &image_url),
    )
    .await?;

    Ok(Json(updated.into()))
}
