//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;
mod config;
mod health;
mod rate_limit;
mod shutdown;

use auth::{
    AuthConfig, InMemoryUserRepository, PgUserRepository, auth_router, auth_router_generic,
};
use platform::rate_limit::InMemoryRateLimitStore;
use platform::token::TokenService;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let auth_config = match &config.jwt_secret {
        Some(secret) => {
            AuthConfig::with_secret(secret.as_bytes(), config.jwt_ttl, config.bcrypt_cost)
        }
        None => {
            tracing::warn!("JWT_SECRET is not set, tokens will not survive a restart");
            AuthConfig::new(
                TokenService::with_random_secret(config.jwt_ttl),
                config.bcrypt_cost,
            )
        }
    };

    let mut pool = None;
    let auth_routes = match &config.database_url {
        Some(database_url) => {
            let db = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&db)
                .await?;

            tracing::info!("Migrations completed");

            let routes = auth_router(PgUserRepository::new(db.clone()), auth_config);
            pool = Some(db);
            routes
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using the in-memory user store");
            auth_router_generic(InMemoryUserRepository::new(), auth_config)
        }
    };

    let limiter = InMemoryRateLimitStore::new();
    let purge_task = rate_limit::spawn_purge_task(limiter.clone());

    let app = app::build_app(auth_routes, &config, limiter);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(environment = %config.app_env, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown::shutdown_signal())
    .await?;

    purge_task.abort();
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }
    tracing::info!("Server stopped");

    Ok(())
}
