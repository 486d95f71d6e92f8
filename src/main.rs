mod app;
mod auth;
mod config;
mod db;
mod entities;
mod error;
mod mapping;
mod models;
mod repository;
mod routes;
mod service;
mod validation;

use std::sync::Arc;

use crate::{
    auth::TokenService, config::Config, repository::SeaOrmMovieRepository, service::MovieService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub movies: MovieService,
    pub tokens: TokenService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,movies=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config).await?;
    let movies = MovieService::new(Arc::new(SeaOrmMovieRepository::new(db)));
    let tokens = TokenService::new(&config.jwt);

    let state = Arc::new(AppState { config: config.clone(), movies, tokens });
    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, env = ?config.environment, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
