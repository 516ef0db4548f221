//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! `kernel::error::AppError` problem responses produced by the auth crate.

use anyhow::Context;
use auth::{
    AdminCredentials, AuthConfig, BootstrapAdminUseCase, JwtSecret, PgAuthRepository,
    TokenLifecycleManager,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragchat_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Auth configuration
    let auth_config = load_auth_config()?;
    auth_config
        .validate()
        .context("invalid auth configuration")?;

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .map(|v| v.parse::<u32>())
        .transpose()
        .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
        .unwrap_or(5);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await?;

    tracing::info!(max_connections, "Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let shared_config = Arc::new(auth_config.clone());

    // Expired token records: first pass at startup, then every purge_interval
    spawn_token_purge(TokenLifecycleManager::new(
        auth_repo.clone(),
        auth_repo.clone(),
        shared_config.clone(),
    ));

    // Administrator bootstrap
    BootstrapAdminUseCase::new(auth_repo.clone(), shared_config)
        .execute()
        .await
        .context("administrator bootstrap failed")?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/v1", auth::auth_router(PgAuthRepository::new(pool), auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .map(|v| v.parse::<u16>())
        .transpose()
        .context("PORT must be a valid port number")?
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match (env::var("ACCESS_SECRET"), env::var("REFRESH_SECRET")) {
        (Ok(access), Ok(refresh)) => AuthConfig::new(
            JwtSecret::new(access.into_bytes()),
            JwtSecret::new(refresh.into_bytes()),
        ),
        _ if cfg!(debug_assertions) => AuthConfig::development(),
        _ => anyhow::bail!("ACCESS_SECRET and REFRESH_SECRET must be set in production"),
    };

    config.password_pepper = env::var("PASSWORD_PEPPER").ok().map(String::into_bytes);

    if let (Ok(email), Ok(password)) = (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
        config.admin = Some(AdminCredentials { email, password });
    }

    if let Ok(secs) = env::var("TOKEN_PURGE_INTERVAL_SECS") {
        let secs = secs
            .parse::<u64>()
            .context("TOKEN_PURGE_INTERVAL_SECS must be a positive integer")?;
        config.purge_interval = Duration::from_secs(secs);
    }

    Ok(config)
}

/// Failures are logged and retried on the next tick.
fn spawn_token_purge(lifecycle: TokenLifecycleManager<PgAuthRepository, PgAuthRepository>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(lifecycle.config().purge_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = lifecycle.purge_expired().await {
                tracing::warn!(error = %e, "Token purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
