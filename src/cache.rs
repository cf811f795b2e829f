use anyhow::{Context, Result};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::RequestError;
use crate::models::RefreshSession;

/// How long a news record stays cached after a read or create.
pub const NEWS_CACHE_TTL_SECS: u64 = 300;
/// How long denormalized user attributes stay cached during token refresh.
pub const USER_CACHE_TTL_SECS: u64 = 600;
/// Refresh-session validity window.
pub const SESSION_TTL_SECS: u64 = 30 * 86400;

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager> {
    let client = Client::open(redis_url).context("Invalid REDIS_URL")?;
    client
        .get_connection_manager()
        .await
        .context("Failed to connect to redis")
}

pub fn news_key(id: i32) -> String {
    format!("news:{}", id)
}

pub fn user_key(id: i32) -> String {
    format!("user:{}", id)
}

pub fn session_key(user_id: i32, refresh_token: &str) -> String {
    format!("session:{}:{}", user_id, refresh_token)
}

/// Serialize and store under `key` with a TTL. Values are plain JSON so the
/// store stays inspectable with redis-cli.
pub async fn cache_set<T: Serialize>(
    redis: &mut ConnectionManager,
    key: &str,
    value: &T,
    ttl_secs: u64,
) -> Result<(), RequestError> {
    let data = serde_json::to_string(value).map_err(|_| RequestError::ServerError)?;
    redis.set_ex::<_, _, ()>(key, data, ttl_secs).await?;
    Ok(())
}

/// A missing key and an undeserializable value are both a miss, never an
/// error; callers fall through to the relational store.
pub async fn cache_get<T: DeserializeOwned>(
    redis: &mut ConnectionManager,
    key: &str,
) -> Result<Option<T>, RequestError> {
    let raw: Option<String> = redis.get(key).await?;
    Ok(raw.and_then(|data| serde_json::from_str(&data).ok()))
}

pub async fn cache_delete(redis: &mut ConnectionManager, key: &str) -> Result<(), RequestError> {
    redis.del::<_, ()>(key).await?;
    Ok(())
}

pub async fn store_session(
    redis: &mut ConnectionManager,
    refresh_token: &str,
    session: &RefreshSession,
) -> Result<(), RequestError> {
    let key = session_key(session.user_id, refresh_token);
    cache_set(redis, &key, session, SESSION_TTL_SECS).await
}

/// Finds the session owning `refresh_token`, whichever user it belongs to.
/// The token is the key fragment, so this is a key-space scan rather than an
/// indexed lookup; acceptable at this scale.
pub async fn find_session_by_token(
    redis: &mut ConnectionManager,
    refresh_token: &str,
) -> Result<Option<(String, RefreshSession)>, RequestError> {
    let pattern = format!("session:*:{}", refresh_token);
    let keys: Vec<String> = redis.keys(pattern).await?;
    let key = match keys.into_iter().next() {
        Some(key) => key,
        None => return Ok(None),
    };
    let session = cache_get::<RefreshSession>(redis, &key).await?;
    Ok(session.map(|session| (key, session)))
}

/// Revokes every session holding `refresh_token`. Idempotent.
pub async fn delete_sessions_by_token(
    redis: &mut ConnectionManager,
    refresh_token: &str,
) -> Result<(), RequestError> {
    let pattern = format!("session:*:{}", refresh_token);
    let keys: Vec<String> = redis.keys(pattern).await?;
    for key in keys {
        redis.del::<_, ()>(&key).await?;
    }
    Ok(())
}

pub async fn list_sessions_for_user(
    redis: &mut ConnectionManager,
    user_id: i32,
) -> Result<Vec<(String, RefreshSession)>, RequestError> {
    let pattern = format!("session:{}:*", user_id);
    let keys: Vec<String> = redis.keys(pattern).await?;
    let mut sessions = Vec::with_capacity(keys.len());
    for key in keys {
        // Entries can expire or be unreadable mid-enumeration; skip them.
        if let Some(session) = cache_get::<RefreshSession>(redis, &key).await? {
            sessions.push((key, session));
        }
    }
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        assert_eq!(news_key(12), "news:12");
        assert_eq!(user_key(3), "user:3");
        assert_eq!(session_key(5, "abcd"), "session:5:abcd");
    }

    #[test]
    fn session_record_round_trips_as_json() {
        let session = RefreshSession {
            user_id: 5,
            user_agent: "curl/8.0".to_string(),
            created_at: 1_700_000_000,
            expires_at: 1_700_000_000 + SESSION_TTL_SECS as i64,
        };
        let data = serde_json::to_string(&session).unwrap();
        let back: RefreshSession = serde_json::from_str(&data).unwrap();
        assert_eq!(back.user_id, 5);
        assert_eq!(back.user_agent, "curl/8.0");
        assert_eq!(back.expires_at, session.expires_at);
    }

    #[test]
    fn session_ttl_is_thirty_days() {
        assert_eq!(SESSION_TTL_SECS, 2_592_000);
    }
}
