use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use super::AppState;
use crate::{
    api::models::*,
    auth::AuthUser,
    db::{self, models::UpdateProfile},
    media::{self, MediaKind},
    utils::{
        sanitize::sanitize_user_text,
        validation::{validate_text, validate_theme},
    },
    Error, Result,
};

const MAX_ABOUT_ME_CHARS: usize = 1000;

/// Only the account owner may change a profile
fn ensure_self(user_id: Uuid, current: Uuid) -> Result<()> {
    if user_id != current {
        return Err(Error::Forbidden("Not allowed".to_string()));
    }
    Ok(())
}

/// GET /users/me - Current user
pub async fn me(AuthUser(user): AuthUser) -> Result<Json<UserRead>> {
    Ok(Json(user.into()))
}

/// GET /users/:id - Public profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRead>> {
    debug!("Get user request: {}", id);

    let user = db::users::get_user(&state.pool, id).await?;
    Ok(Json(user.into()))
}

/// PUT /users/:id - Partial profile update
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateProfile>,
) -> Result<Json<UserRead>> {
    debug!("Update user request: {} {:?}", id, update);
    ensure_self(id, current.id)?;

    let update = UpdateProfile {
        avatar_url: update
            .avatar_url
            .map(|url| validate_text("Avatar URL", &url, 512))
            .transpose()?,
        about_me: update
            .about_me
            .map(|text| {
                let text = sanitize_user_text(&text);
                if text.chars().count() > MAX_ABOUT_ME_CHARS {
                    Err(Error::Validation(format!(
                        "About me must be at most {MAX_ABOUT_ME_CHARS} characters"
                    )))
                } else {
                    Ok(text)
                }
            })
            .transpose()?,
        is_profile_private: update.is_profile_private,
        theme_settings: update
            .theme_settings
            .map(|theme| validate_theme(&theme))
            .transpose()?,
    };

    let user = db::users::update_profile(&state.pool, id, &update).await?;
    Ok(Json(user.into()))
}

/// POST /users/:id/avatar - Upload a new avatar
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UserRead>> {
    debug!("Upload avatar request: {}", id);
    ensure_self(id, current.id)?;

    let media_config = &state.settings.media;
    let upload = media::read_image_field(&mut multipart, media_config.max_upload_size).await?;
    let avatar_url = media::save_image(media_config, MediaKind::Avatars, &upload).await?;

    let user = media::replace_image(
        media_config,
        current.avatar_url.as_deref(),
        &avatar_url,
        db::users::set_avatar_url(&state.pool, id, &avatar_url),
    )
    .await?;

    Ok(Json(user.into()))
}
