//! Agendo - weekly activity scheduling core for community portals

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agendo::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxActivityRepository, SqlxUserRepository},
    },
    services::{auth::AuthService, schedule::ScheduleService, token::TokenService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agendo=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Agendo scheduling service...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    let secret = config.require_secret()?;
    let timezone = config.schedule.timezone()?;
    tracing::info!(
        "Configuration loaded (canonical timezone UTC{:+})",
        config.schedule.utc_offset_hours
    );

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories and services
    let activity_repo = SqlxActivityRepository::shared(pool.clone());
    let user_repo = SqlxUserRepository::shared(pool.clone());

    let tokens = Arc::new(TokenService::new(secret, config.auth.token_ttl_days));
    let auth_service = Arc::new(AuthService::new(user_repo, tokens.clone()));
    let schedule_service = Arc::new(ScheduleService::new(
        activity_repo,
        tokens.clone(),
        timezone,
    ));

    // Seed the admin account on a fresh deployment
    if let (Some(username), Some(password)) =
        (&config.auth.admin_username, &config.auth.admin_password)
    {
        auth_service.seed_admin(username, password).await?;
    }

    // Build application state
    let state = AppState {
        schedule_service,
        auth_service,
        tokens,
        default_upcoming_limit: config.schedule.default_upcoming_limit,
        token_ttl_days: config.auth.token_ttl_days,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    pool.close().await;
    Ok(())
}
