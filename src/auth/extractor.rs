use crate::api::handlers::AppState;
use crate::auth::jwt::decode_access_token;
use crate::db::{models::User, users};
use crate::error::Error;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

/// The user behind a valid `Authorization: Bearer <token>` header.
///
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> Result<Json<UserRead>> { ... }
/// ```
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| Error::Unauthorized("Not authenticated".to_string()))?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| Error::Unauthorized("Invalid Authorization header".to_string()))?;

        let user_id = decode_access_token(token.trim(), &state.settings.auth)?;

        let user = users::find_user(&state.pool, user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                debug!("Token for unknown or inactive user {}", user_id);
                Error::Unauthorized("Could not validate credentials".to_string())
            })?;

        Ok(AuthUser(user))
    }
}
