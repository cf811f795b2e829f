mod authentication;
mod cache;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::{routing::*, Extension, Router};
use handlers::*;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

pub use config::Config;

/// Shared per-process state: connection pools and configuration, passed down
/// to every handler through an `Extension`.
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub http: reqwest::Client,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let db = init_db(&config.database_url).await?;
        let redis = cache::init_redis(&config.redis_url).await?;
        Ok(AppState {
            db,
            redis,
            http: reqwest::Client::new(),
            config,
        })
    }
}

pub async fn init_db(database_url: &str) -> Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}

pub fn make_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/check_health", get(alive))
        // users
        .route("/api/users/list", get(list_users))
        .route("/api/users/create", post(create_user))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id/update", put(update_user))
        .route("/api/users/:id/delete", delete(delete_user))
        // news
        .route("/api/news/list", get(list_news))
        .route("/api/news/create", post(create_news))
        .route("/api/news/:id", get(get_news))
        .route("/api/news/:id/update", put(update_news))
        .route("/api/news/:id/delete", delete(delete_news))
        // comments
        .route("/api/news/:id/comments", get(list_comments_for_news))
        .route("/api/news/:id/comments/create", post(create_comment))
        .route("/api/comments/:id", get(get_comment))
        .route("/api/comments/:id/update", put(update_comment))
        .route("/api/comments/:id/delete", delete(delete_comment))
        // auth
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh_access_token))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/github/login", get(github_login))
        .route("/api/auth/github/callback", get(github_callback))
        .route("/api/auth/sessions", get(list_sessions))
        .fallback(not_found)
        .layer(Extension(state))
}

pub async fn run_app(state: Arc<AppState>) -> Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = make_router(state);
    info!("Server started on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
