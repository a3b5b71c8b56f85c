//! Authentication API endpoints
//!
//! Handles HTTP requests for credential minting:
//! - POST /api/v1/auth/login - Verify a password and mint a credential
//! - GET /api/v1/auth/me - Echo the claims of a presented credential

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{extract_credential_token, ApiError, AppState};
use crate::services::token::TokenError;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Response for user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

/// Response for the current credential's claims
#[derive(Debug, Serialize)]
pub struct ClaimsResponse {
    pub sub: i64,
    pub name: String,
    pub is_admin: bool,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

/// POST /api/v1/auth/login - Verify a password and mint a credential
///
/// The credential is returned in the body and also set as a `session`
/// cookie for browser clients.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (user, token) = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    let max_age = state.token_ttl_days * 24 * 60 * 60;
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, max_age
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::internal_error("Internal error"))?;

    let body = AuthResponse {
        user: UserResponse {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            is_admin: user.is_admin,
        },
        token,
    };

    let mut response = Json(body).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// GET /api/v1/auth/me - Echo the claims of a presented credential
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClaimsResponse>, ApiError> {
    let token = extract_credential_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("No credential presented"))?;

    let claims = state.tokens.verify(&token).map_err(|e| match e {
        TokenError::Invalid => ApiError::unauthorized("Credential is malformed or badly signed"),
        TokenError::Expired => ApiError::unauthorized("Credential has expired"),
    })?;

    Ok(Json(ClaimsResponse {
        sub: claims.sub,
        name: claims.name,
        is_admin: claims.is_admin,
        issued_at: claims.iat,
        expires_at: claims.exp,
    }))
}
