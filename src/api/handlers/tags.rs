use axum::{extract::State, Json};

use super::AppState;
use crate::{api::models::TagRead, db, Result};

/// GET /tags - Tag catalogue ordered by name
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagRead>>> {
    let tags = db::tags::list_tags(&state.pool).await?;
    Ok(Json(tags.into_iter().map(TagRead::from).collect()))
}
