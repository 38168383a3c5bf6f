use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::AppState;
use crate::{
    api::models::*,
    auth::AuthUser,
    db::{self, models::Collection, DbPool},
    media::{self, MediaKind},
    utils::validation::validate_text,
    Error, Result,
};

/// Own picture, else the image of the last recipe added
async fn display_picture(pool: &DbPool, collection: &Collection) -> Result<Option<String>> {
    match &collection.picture_url {
        Some(url) => Ok(Some(url.clone())),
        None => db::collections::last_recipe_image(pool, collection.id).await,
    }
}

async fn collection_read(pool: &DbPool, collection: Collection) -> Result<CollectionRead> {
    let picture_url = display_picture(pool, &collection).await?;
    let recipe_ids = db::collections::recipe_ids(pool, collection.id).await?;
    Ok(CollectionRead::new(collection, picture_url, recipe_ids))
}

/// Load a collection the caller owns
async fn owned_collection(pool: &DbPool, id: Uuid, user_id: Uuid) -> Result<Collection> {
    let collection = db::collections::get_collection(pool, id).await?;
    if collection.owner_id != user_id {
        return Err(Error::Forbidden("Forbidden".to_string()));
    }
    Ok(collection)
}

/// POST /collections
pub async fn create_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CollectionCreate>,
) -> Result<(StatusCode, Json<CollectionRead>)> {
    debug!("Create collection request: {}", req.name);

    let name = validate_text("Name", &req.name, 100)?;
    let collection = db::collections::create_collection(&state.pool, user.id, &name).await?;
    info!("User {} created collection {}", user.id, collection.id);

    Ok((
        StatusCode::CREATED,
        Json(CollectionRead::new(collection, None, Vec::new())),
    ))
}

/// GET /collections/my
pub async fn my_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CollectionBrief>>> {
    let collections = db::collections::list_user_collections(&state.pool, user.id).await?;

    let mut briefs = Vec::with_capacity(collections.len());
    for collection in collections {
        let picture_url = display_picture(&state.pool, &collection).await?;
        briefs.push(CollectionBrief {
            id: collection.id,
            name: collection.name,
            picture_url,
            created_at: collection.created_at,
        });
    }

    Ok(Json(briefs))
}

/// GET /collections/:id
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CollectionRead>> {
    debug!("Get collection request: {}", id);

    let collection = db::collections::get_collection(&state.pool, id).await?;
    Ok(Json(collection_read(&state.pool, collection).await?))
}

/// GET /collections/:id/recipes
pub async fn collection_recipes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RecipeRead>>> {
    let collection = db::collections::get_collection(&state.pool, id).await?;
    let recipes = db::collections::list_collection_recipes(&state.pool, collection.id).await?;
    Ok(Json(recipe_list(recipes)))
}

/// POST /collections/:id/recipes/:recipe_id
pub async fn add_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, recipe_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    debug!("Add recipe {} to collection {}", recipe_id, id);

    let collection = owned_collection(&state.pool, id, user.id).await?;
    let recipe = db::recipes::get_recipe(&state.pool, recipe_id).await?;
    db::collections::add_recipe(&state.pool, collection.id, recipe.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /collections/:id/recipes/:recipe_id
pub async fn remove_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, recipe_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    debug!("Remove recipe {} from collection {}", recipe_id, id);

    let collection = owned_collection(&state.pool, id, user.id).await?;
    db::collections::remove_recipe(&state.pool, collection.id, recipe_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /collections/:id/image
pub async fn upload_collection_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CollectionRead>> {
    debug!("Upload collection image request: {}", id);

    let collection = owned_collection(&state.pool, id, user.id).await?;

    let media_config = &state.settings.media;
    let upload = media::read_image_field(&mut multipart, media_config.max_upload_size).await?;
    let picture_url = media::save_image(media_config, MediaKind::Collections, &upload).await?;

    let updated = media::replace_image(
        media_config,
        collection.picture_url.as_deref(),
        &picture_url,
        db::collections::set_picture_url(&state.pool, id, &picture_url),
    )
    .await?;

    Ok(Json(collection_read(&state.pool, updated).await?))
}
