//! API layer - HTTP handlers and routing
//!
//! The thin transport adapter over the scheduling core:
//! - Activity endpoints (list, upcoming, and the gated mutations)
//! - Auth endpoints (login, current claims)
//!
//! Nothing here makes authorization decisions; handlers forward the raw
//! optional credential to the schedule service.

pub mod activities;
pub mod auth;
pub mod middleware;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{extract_credential_token, ApiError, AppState};

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/activities", activities::router())
        .nest("/auth", auth::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing none", cors_origin);
            CorsLayer::new()
        }
    };

    Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
