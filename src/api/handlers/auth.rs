use axum::{extract::State, http::StatusCode, Form, Json};
use tracing::{debug, info};

use super::AppState;
use crate::{
    api::models::*,
    auth::{create_access_token, hash_password, verify_password},
    db::{self, models::NewUser},
    utils::validation::{validate_email, validate_password, validate_text},
    Error, Result,
};

/// Check credentials and issue a token
async fn issue_token(state: &AppState, email: &str, password: &str) -> Result<TokenResponse> {
    let invalid = || Error::Unauthorized("Invalid credentials".to_string());

    let user = db::users::find_user_by_email(&state.pool, email.trim())
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(invalid)?;

    let password = password.to_string();
    let hashed = user.hashed_password.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .map_err(|e| Error::Internal(format!("Password check failed: {e}")))?;
    if !valid {
        return Err(invalid());
    }

    let token = create_access_token(user.id, &state.settings.auth)?;
    Ok(TokenResponse::bearer(token))
}

/// POST /auth/register - Create an account and log it in
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    debug!("Register request: {}", req.email);

    let email = validate_email(&req.email)?;
    let username = validate_text("Username", &req.username, 50)?;
    validate_password(&req.password)?;

    if db::users::email_exists(&state.pool, &email).await? {
        return Err(Error::Conflict("Email already registered".to_string()));
    }
    if db::users::username_exists(&state.pool, &username).await? {
        return Err(Error::Conflict("Username already taken".to_string()));
    }

    let cost = state.settings.auth.bcrypt_cost;
    let password = req.password;
    let hashed_password = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| Error::Internal(format!("Password hashing failed: {e}")))??;

    let user = db::users::create_user(
        &state.pool,
        &NewUser {
            email,
            username,
            hashed_password,
        },
    )
    .await?;
    info!("Registered user {}", user.id);

    let token = create_access_token(user.id, &state.settings.auth)?;
    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}

/// POST /auth/login - Log in with a JSON body
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    debug!("Login request: {}", req.email);
    Ok(Json(issue_token(&state, &req.email, &req.password).await?))
}

/// POST /auth/token - OAuth2 password flow
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>> {
    debug!("Token request: {}", form.username);
    Ok(Json(
        issue_token(&state, &form.username, &form.password).await?,
    ))
}
