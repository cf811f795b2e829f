use std::sync::Arc;

use crate::errors::RequestError;
use crate::AppState;
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Claims carried by a signed access token. Stateless: everything a guard
/// needs is in the token, nothing is looked up.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: i32,
    pub is_admin: bool,
    pub is_verified_author: bool,
    pub exp: i64,
}

/// The authenticated caller, decoded from a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
    pub is_admin: bool,
    pub is_verified_author: bool,
}

/// As [`AuthUser`], but additionally requires the verified-author role.
pub struct VerifiedAuthor(pub AuthUser);

fn state_from_parts(parts: &Parts) -> Result<Arc<AppState>, RequestError> {
    parts
        .extensions
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(RequestError::ServerError)
}

pub fn token_from_header(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let state = state_from_parts(parts)?;
        let header = parts
            .headers
            .get("Authorization")
            .ok_or(RequestError::NotAuthorized("Not authenticated"))?;
        let header = header
            .to_str()
            .map_err(|_| RequestError::NotAuthorized("Invalid token"))?;
        let token =
            token_from_header(header).ok_or(RequestError::NotAuthorized("Invalid token"))?;
        verify_access_token(token, &state.config.jwt_secret)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for VerifiedAuthor
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_verified_author {
            return Err(RequestError::Forbidden(
                "Only verified authors can create news",
            ));
        }
        Ok(VerifiedAuthor(user))
    }
}

pub fn issue_access_token(user: &AuthUser, secret: &str, expires_min: i64) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + time::Duration::minutes(expires_min);
    let claims = AccessClaims {
        id: user.id,
        is_admin: user.is_admin,
        is_verified_author: user.is_verified_author,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to sign access token")
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<AuthUser, RequestError> {
    let mut validation = jsonwebtoken::Validation::default();
    validation.leeway = 0;
    let token_data = jsonwebtoken::decode::<AccessClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map_err(|_| RequestError::NotAuthorized("Invalid token"))?;
    let claims = token_data.claims;
    if claims.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(AuthUser {
        id: claims.id,
        is_admin: claims.is_admin,
        is_verified_author: claims.is_verified_author,
    })
}

/// Ownership guard: the acting user must be the resource's author. Admins
/// pass unconditionally.
pub fn ensure_owner(author_id: i32, user: &AuthUser) -> Result<(), RequestError> {
    if user.id == author_id || user.is_admin {
        Ok(())
    } else {
        Err(RequestError::Forbidden("Not the author of this resource"))
    }
}

/// 32 random bytes, hex-encoded. Opaque: meaningful only as a session key
/// fragment in the cache store.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn verify_password_argon2(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to parse password hash"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn sample_user() -> AuthUser {
        AuthUser {
            id: 7,
            is_admin: false,
            is_verified_author: true,
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let token = issue_access_token(&sample_user(), SECRET, 15).unwrap();
        let decoded = verify_access_token(&token, SECRET).unwrap();
        assert_eq!(decoded.id, 7);
        assert!(!decoded.is_admin);
        assert!(decoded.is_verified_author);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_access_token(&sample_user(), SECRET, -120).unwrap();
        let result = verify_access_token(&token, SECRET);
        assert!(matches!(result, Err(RequestError::NotAuthorized(_))));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_access_token(&sample_user(), SECRET, 15).unwrap();
        let result = verify_access_token(&token, "other-secret");
        assert!(matches!(result, Err(RequestError::NotAuthorized(_))));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(token_from_header("Bearer abc"), Some("abc"));
        assert_eq!(token_from_header("Token abc"), None);
        assert_eq!(token_from_header("abc"), None);
    }

    #[test]
    fn ownership_guard_admits_author_and_admin() {
        let author = AuthUser {
            id: 3,
            is_admin: false,
            is_verified_author: false,
        };
        assert!(ensure_owner(3, &author).is_ok());
        assert!(matches!(
            ensure_owner(4, &author),
            Err(RequestError::Forbidden(_))
        ));

        let admin = AuthUser {
            id: 9,
            is_admin: true,
            is_verified_author: false,
        };
        assert!(ensure_owner(4, &admin).is_ok());
    }

    #[test]
    fn refresh_tokens_are_opaque_hex() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_refresh_token());
    }

    #[tokio::test]
    async fn password_hash_round_trips() {
        let hash = hash_password_argon2("hunter42".to_string()).await.unwrap();
        assert!(verify_password_argon2("hunter42".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_argon2("hunter43".to_string(), hash)
            .await
            .unwrap());
    }
}
