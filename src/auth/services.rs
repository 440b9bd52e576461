use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::Credentials,
        jwt::{JwtKeys, TokenError},
        password::{hash_password, verify_password},
    },
    error::AccountError,
    state::AppState,
    users::{StoreError, User},
};

fn require_present(creds: &Credentials) -> Result<(), AccountError> {
    if creds.username.is_empty() || creds.password.is_empty() {
        return Err(AccountError::BadRequest(
            "username and password are required".into(),
        ));
    }
    Ok(())
}

/// Hash the password and persist a new user. A taken username surfaces as a
/// generic internal error, same as any other storage failure.
pub async fn register(state: &AppState, creds: Credentials) -> Result<User, AccountError> {
    require_present(&creds)?;

    let hash = hash_password(&creds.password)
        .map_err(|_| AccountError::Internal("Error while hashing password"))?;

    match state.users.create(&creds.username, &hash).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(StoreError::Duplicate) => {
            warn!(username = %creds.username, "username already registered");
            Err(AccountError::Internal("Error while registering user"))
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            Err(AccountError::Internal("Error while registering user"))
        }
    }
}

/// Check credentials and issue a signed token. An unknown username is
/// reported like a storage failure (500), not as a 401.
pub async fn login(state: &AppState, creds: Credentials) -> Result<String, AccountError> {
    require_present(&creds)?;

    let user = match state.users.find_by_username(&creds.username).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            warn!(username = %creds.username, "login unknown username");
            return Err(AccountError::Internal("Error while logging in"));
        }
        Err(e) => {
            error!(error = %e, "find_by_username failed");
            return Err(AccountError::Internal("Error while logging in"));
        }
    };

    let ok = verify_password(&creds.password, &user.password_hash)
        .map_err(|_| AccountError::Internal("Error while logging in"))?;
    if !ok {
        warn!(username = %user.username, user_id = %user.id, "login invalid password");
        return Err(AccountError::Unauthorized("Invalid password"));
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys
        .sign(&user.username, OffsetDateTime::now_utc())
        .map_err(|e| match e {
            TokenError::MissingSecret => {
                error!("JWT_SECRET is not configured");
                AccountError::Internal("JWT Secret not found")
            }
            TokenError::InvalidTtl => {
                error!("JWT_TTL_HOURS does not produce a valid expiry");
                AccountError::Internal("Error while generating token")
            }
            TokenError::Signing(e) => {
                error!(error = %e, "jwt sign failed");
                AccountError::Internal("Error while generating token")
            }
        })?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(token)
}

pub async fn get_user(state: &AppState, username: &str) -> Result<User, AccountError> {
    match state.users.find_by_username(username).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound) => Err(AccountError::NotFound("User not found")),
        Err(e) => {
            error!(error = %e, username = %username, "find_by_username failed");
            Err(AccountError::Internal("Error while fetching user"))
        }
    }
}
