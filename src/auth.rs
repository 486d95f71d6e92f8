use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, config::JwtConfig, error::AppError};

pub const SUBJECT: &str = "api-user";
pub const ROLE: &str = "api-user";
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is missing in configuration.")]
    MissingSecret,
    #[error("no bearer token in the Authorization header")]
    MissingBearer,
    #[error("bearer token rejected: {0}")]
    Rejected(jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and checks HS256 bearer tokens signed with the shared secret.
#[derive(Clone)]
pub struct TokenService {
    keys: Option<Keys>,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        if config.secret.is_none() {
            tracing::warn!("JWT_SECRET is not set; tokens cannot be issued or accepted");
        }

        let keys = config.secret.as_deref().map(|secret| Keys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        });
        Self { keys, issuer: config.issuer.clone(), audience: config.audience.clone() }
    }

    pub fn issue(&self) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;
        let now = jiff::Timestamp::now().as_second();

        let claims = Claims {
            sub: SUBJECT.to_string(),
            role: ROLE.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        jsonwebtoken::decode::<Claims>(token, &keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Rejected)
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim()).filter(|t| !t.is_empty())
}

/// Rejects the request with 401 unless it carries a valid bearer token.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or(TokenError::MissingBearer)?;
    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        // Without a secret nothing can be verified; the caller sees a plain 401.
        Err(TokenError::MissingSecret) => return Err(TokenError::MissingBearer.into()),
        Err(err) => return Err(err.into()),
    };

    debug!(sub = %claims.sub, jti = %claims.jti, "bearer token accepted");
    Ok(next.run(req).await)
}
