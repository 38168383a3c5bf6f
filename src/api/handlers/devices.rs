use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use super::AppState;
use crate::{
    api::models::*, auth::AuthUser, db, utils::validation::validate_text, Error, Result,
};

/// POST /devices/register - Register a push token for the caller
pub async fn register_device(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<DeviceRegister>,
) -> Result<(StatusCode, Json<DeviceRead>)> {
    let token = validate_text("Token", &req.token, 255)?;
    let platform = validate_text("Platform", &req.platform, 20)?;
    debug!("Register device request: {} ({})", user.id, platform);

    if db::devices::find_by_token(&state.pool, &token).await?.is_some() {
        return Err(Error::Conflict("Token already registered".to_string()));
    }

    let device = db::devices::register_device(&state.pool, user.id, &token, &platform).await?;
    info!("Registered {} device for user {}", device.platform, user.id);

    Ok((StatusCode::CREATED, Json(device.into())))
}

/// DELETE /devices/:token - Forget one of the caller's tokens
pub async fn unregister_device(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    if !db::devices::delete_device(&state.pool, user.id, &token).await? {
        debug!("No device token to remove for user {}", user.id);
    }
    Ok(StatusCode::NO_CONTENT)
}
