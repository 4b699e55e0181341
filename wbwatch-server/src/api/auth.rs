//! Token issuance and bearer-token middleware

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use wbwatch_common::auth::{
    create_access_token, decode_access_token, verify_password, ACCESS_TOKEN_TTL,
};

use super::ApiError;
use crate::{db, AppState};

/// Form-encoded credential pair for POST /token
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /token
///
/// Exchanges username/password for a bearer token; 401 on a bad pair.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    info!(username = %form.username, "Token requested");

    let account = db::find_user(&state.db, &form.username).await?;
    let valid = account
        .as_ref()
        .map(|a| verify_password(&form.password, &a.password_salt, &a.password_hash))
        .unwrap_or(false);

    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        ));
    }

    let token = create_access_token(&form.username, &state.jwt_secret, ACCESS_TOKEN_TTL)?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Bearer-token middleware for the /api/v1 routes
///
/// 401 on a missing, malformed, expired or tampered token. The health and
/// token endpoints do not pass through here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    decode_access_token(token, &state.jwt_secret)?;

    Ok(next.run(request).await)
}
