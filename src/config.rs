use std::net::SocketAddr;

use anyhow::Context;
use axum::http::HeaderValue;

pub const DEFAULT_CORS_ORIGIN: &str = "https://movies-rd.azurewebsites.net";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub db_max_retries: u32,
    pub db_max_retry_delay_secs: u64,
    pub environment: Environment,
    pub cors_allowed_origin: HeaderValue,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movies.db?mode=rwc".to_string());

        let db_max_retries: u32 =
            std::env::var("DB_MAX_RETRIES").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        let db_max_retry_delay_secs: u64 = std::env::var("DB_MAX_RETRY_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let environment = match std::env::var("APP_ENV") {
            Ok(env) if !env.eq_ignore_ascii_case("development") => Environment::Production,
            _ => Environment::Development,
        };

        let cors_allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string())
            .parse::<HeaderValue>()
            .context("CORS_ALLOWED_ORIGIN")?;

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "movies-api".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "movies-api-clients".to_string()),
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            db_max_retries,
            db_max_retry_delay_secs,
            environment,
            cors_allowed_origin,
            jwt,
        })
    }
}
