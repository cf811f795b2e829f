use std::sync::Arc;

use axum::{
    extract::Query,
    http::{header, HeaderMap},
    response::Redirect,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::{
    authentication::{
        generate_refresh_token, hash_password_argon2, issue_access_token, verify_password_argon2,
        AuthUser,
    },
    cache::{
        cache_delete, cache_get, cache_set, delete_sessions_by_token, find_session_by_token,
        list_sessions_for_user, store_session, user_key, SESSION_TTL_SECS, USER_CACHE_TTL_SECS,
    },
    data_formats::{
        validate_password, AccessTokenResponse, CreateUserRequest, LoginRequest,
        OAuthCallbackParams, RefreshRequest, RegisterRequest, SessionResponse, StatusResponse,
        TokenPairResponse,
    },
    db_helpers::{get_user_by_email, get_user_by_id, insert_user},
    errors::RequestError,
    models::{RefreshSession, User},
    AppState,
};

/// Denormalized user attributes cached under `user:{id}` for the token
/// refresh path, so a refresh usually avoids the relational store.
#[derive(Debug, Serialize, Deserialize)]
struct CachedUserAttrs {
    id: i32,
    is_admin: bool,
    is_verified_author: bool,
}

const TOKEN_TYPE: &str = "bearer";

fn user_agent_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Mints the short-lived access token and the long-lived refresh token, and
/// records the refresh session in the cache store.
async fn issue_token_pair(
    state: &AppState,
    user: &User,
    user_agent: String,
) -> Result<TokenPairResponse, RequestError> {
    let claims = AuthUser {
        id: user.id,
        is_admin: user.is_admin,
        is_verified_author: user.is_verified_author,
    };
    let access_token = issue_access_token(
        &claims,
        &state.config.jwt_secret,
        state.config.jwt_expires_min,
    )
    .map_err(|_| RequestError::ServerError)?;

    let refresh_token = generate_refresh_token();
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let session = RefreshSession {
        user_id: user.id,
        user_agent,
        created_at: now,
        expires_at: now + SESSION_TTL_SECS as i64,
    };
    let mut redis = state.redis.clone();
    store_session(&mut redis, &refresh_token, &session).await?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.config.jwt_expires_min * 60,
    })
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenPairResponse>, RequestError> {
    validate_password(&request.password)?;
    if get_user_by_email(&state.db, &request.email).await?.is_some() {
        return Err(RequestError::Conflict("Email already exists"));
    }

    let password_hash = hash_password_argon2(request.password)
        .await
        .map_err(|_| RequestError::ServerError)?;
    let user = insert_user(
        &state.db,
        &CreateUserRequest {
            name: request.name,
            email: request.email,
            is_verified_author: false,
            avatar_url: None,
        },
        Some(&password_hash),
    )
    .await?;
    info!("Registered user {}", user.id);

    let user_agent = user_agent_from_headers(&headers);
    let tokens = issue_token_pair(&state, &user, user_agent).await?;
    Ok(Json(tokens))
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, RequestError> {
    let user = get_user_by_email(&state.db, &request.email)
        .await?
        .ok_or(RequestError::NotAuthorized("Invalid credentials"))?;
    // SSO-only accounts have no password hash and cannot log in this way.
    let hash = user
        .password_hash
        .clone()
        .ok_or(RequestError::NotAuthorized("Invalid credentials"))?;
    let password_matches = verify_password_argon2(request.password, hash)
        .await
        .map_err(|_| RequestError::ServerError)?;
    if !password_matches {
        return Err(RequestError::NotAuthorized("Invalid credentials"));
    }

    let user_agent = user_agent_from_headers(&headers);
    let tokens = issue_token_pair(&state, &user, user_agent).await?;
    Ok(Json(tokens))
}

/// Re-issues an access token against a stored refresh session. The refresh
/// token itself is unchanged.
pub async fn refresh_access_token(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, RequestError> {
    let mut redis = state.redis.clone();
    let (key, session) = find_session_by_token(&mut redis, &request.refresh_token)
        .await?
        .ok_or(RequestError::NotAuthorized("Invalid refresh token"))?;

    let now = OffsetDateTime::now_utc().unix_timestamp();
    if session.is_expired(now) {
        cache_delete(&mut redis, &key).await?;
        return Err(RequestError::NotAuthorized("Session expired"));
    }

    let attrs = match cache_get::<CachedUserAttrs>(&mut redis, &user_key(session.user_id)).await? {
        Some(attrs) => attrs,
        None => {
            let user = get_user_by_id(&state.db, session.user_id)
                .await?
                .ok_or(RequestError::NotAuthorized("Invalid refresh token"))?;
            let attrs = CachedUserAttrs {
                id: user.id,
                is_admin: user.is_admin,
                is_verified_author: user.is_verified_author,
            };
            cache_set(&mut redis, &user_key(user.id), &attrs, USER_CACHE_TTL_SECS).await?;
            attrs
        }
    };

    let claims = AuthUser {
        id: attrs.id,
        is_admin: attrs.is_admin,
        is_verified_author: attrs.is_verified_author,
    };
    let access_token = issue_access_token(
        &claims,
        &state.config.jwt_secret,
        state.config.jwt_expires_min,
    )
    .map_err(|_| RequestError::ServerError)?;
    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<StatusResponse>, RequestError> {
    let mut redis = state.redis.clone();
    delete_sessions_by_token(&mut redis, &request.refresh_token).await?;
    Ok(Json(StatusResponse { status: "ok" }))
}

pub async fn list_sessions(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, RequestError> {
    let mut redis = state.redis.clone();
    let sessions = list_sessions_for_user(&mut redis, user.id).await?;
    Ok(Json(
        sessions
            .into_iter()
            .map(|(key, session)| SessionResponse::new(key, session))
            .collect(),
    ))
}

// ----------------- GitHub SSO -----------------

#[derive(Debug, Deserialize)]
struct GithubTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GithubUserInfo {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

pub async fn github_login(Extension(state): Extension<Arc<AppState>>) -> Redirect {
    let url = format!(
        "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&scope=user:email",
        state.config.github_client_id, state.config.github_redirect_url
    );
    Redirect::temporary(&url)
}

/// Exchanges the OAuth code, then resolves or creates the matching user.
/// GitHub may withhold the email; a noreply address is synthesized from the
/// provider's user id in that case.
pub async fn github_callback(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Json<TokenPairResponse>, RequestError> {
    let token: GithubTokenResponse = state
        .http
        .post("https://github.com/login/oauth/access_token")
        .header(header::ACCEPT, "application/json")
        .json(&serde_json::json!({
            "client_id": state.config.github_client_id,
            "client_secret": state.config.github_client_secret,
            "code": params.code,
            "redirect_uri": state.config.github_redirect_url,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let info: GithubUserInfo = state
        .http
        .get("https://api.github.com/user")
        .header(header::ACCEPT, "application/json")
        .header(header::USER_AGENT, "newswire")
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let email = info
        .email
        .unwrap_or_else(|| format!("{}@users.noreply.github.com", info.id));
    let name = info.name.unwrap_or(info.login);

    let user = match get_user_by_email(&state.db, &email).await? {
        Some(user) => user,
        None => {
            let user = insert_user(
                &state.db,
                &CreateUserRequest {
                    name,
                    email,
                    is_verified_author: false,
                    avatar_url: None,
                },
                None,
            )
            .await?;
            info!("Created user {} from github login", user.id);
            user
        }
    };

    let user_agent = user_agent_from_headers(&headers);
    let tokens = issue_token_pair(&state, &user, user_agent).await?;
    Ok(Json(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_github_email_is_synthesized() {
        let info = GithubUserInfo {
            id: 583231,
            login: "octocat".to_string(),
            name: None,
            email: None,
        };
        let email = info
            .email
            .unwrap_or_else(|| format!("{}@users.noreply.github.com", info.id));
        let name = info.name.unwrap_or(info.login);
        assert_eq!(email, "583231@users.noreply.github.com");
        assert_eq!(name, "octocat");
    }

    #[test]
    fn github_payloads_tolerate_extra_fields() {
        let token: GithubTokenResponse = serde_json::from_str(
            r#"{"access_token": "gho_abc", "scope": "user:email", "token_type": "bearer"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "gho_abc");

        let info: GithubUserInfo = serde_json::from_str(
            r#"{"id": 1, "login": "octocat", "name": null, "email": null, "avatar_url": "x"}"#,
        )
        .unwrap();
        assert_eq!(info.login, "octocat");
        assert!(info.email.is_none());
    }
}
