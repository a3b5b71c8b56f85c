//! API middleware and shared request plumbing
//!
//! Holds the shared application state, the structured error envelope all
//! endpoints return, and credential extraction from the request. Note
//! that authorization itself is not middleware: handlers hand the raw
//! optional token to the schedule service, which is the single place the
//! admin gate is enforced.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::auth::{AuthService, AuthServiceError};
use crate::services::schedule::{ScheduleService, ScheduleServiceError};
use crate::services::token::TokenService;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub schedule_service: Arc<ScheduleService>,
    pub auth_service: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    pub default_upcoming_limit: usize,
    pub token_ttl_days: i64,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ScheduleServiceError> for ApiError {
    fn from(err: ScheduleServiceError) -> Self {
        match err {
            ScheduleServiceError::Unauthenticated
            | ScheduleServiceError::InvalidToken
            | ScheduleServiceError::Expired => ApiError::unauthorized(err.to_string()),
            ScheduleServiceError::Forbidden => ApiError::forbidden(err.to_string()),
            ScheduleServiceError::InvalidInput(_) => ApiError::validation_error(err.to_string()),
            ScheduleServiceError::Duplicate(_) => ApiError::conflict(err.to_string()),
            ScheduleServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            // Detail stays in the server log
            ScheduleServiceError::Internal(_) => ApiError::internal_error("Internal error"),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            AuthServiceError::ValidationError(_) => ApiError::validation_error(err.to_string()),
            AuthServiceError::InternalError(_) => ApiError::internal_error("Internal error"),
        }
    }
}

/// Extract the session credential from a request.
///
/// `Authorization: Bearer` takes priority; the `session` cookie is the
/// fallback for browser clients.
pub fn extract_credential_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}
