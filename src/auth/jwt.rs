use axum::extract::FromRef;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT Secret not found")]
    MissingSecret,
    #[error("token lifetime is not a usable duration")]
    InvalidTtl,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// JWT payload asserting a username.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub exp: i64, // expires at (unix timestamp)
}

/// HS256 signing material. The secret stays optional until a token is
/// actually requested.
#[derive(Clone)]
pub struct JwtKeys {
    secret: Option<String>,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            secret: cfg.secret.clone().filter(|s| !s.is_empty()),
            ttl: Duration::seconds(cfg.ttl_hours.saturating_mul(3600)),
        }
    }

    pub fn sign(&self, username: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let secret = self.secret.as_deref().ok_or(TokenError::MissingSecret)?;
        if !self.ttl.is_positive() {
            return Err(TokenError::InvalidTtl);
        }
        let expires_at = now.checked_add(self.ttl).ok_or(TokenError::InvalidTtl)?;
        let claims = Claims {
            username: username.to_string(),
            exp: expires_at.unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        debug!(username = %username, exp = claims.exp, "jwt signed");
        Ok(token)
    }
}
