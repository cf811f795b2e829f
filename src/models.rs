use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub registered_at: NaiveDateTime,
    pub is_verified_author: bool,
    pub is_admin: bool,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct News {
    pub id: i32,
    pub title: String,
    pub content: serde_json::Value,
    pub published_at: NaiveDateTime,
    pub cover_url: Option<String>,
    pub author_id: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub published_at: NaiveDateTime,
    pub news_id: i32,
    pub author_id: i32,
}

/// Refresh-session record. Lives only in Redis, keyed by
/// `session:{user_id}:{refresh_token}`; the store's TTL matches
/// `expires_at`, so records age out on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSession {
    pub user_id: i32,
    pub user_agent: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl RefreshSession {
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshSession;

    #[test]
    fn session_expiry_is_strict() {
        let session = RefreshSession {
            user_id: 1,
            user_agent: String::new(),
            created_at: 0,
            expires_at: 100,
        };
        assert!(!session.is_expired(99));
        assert!(!session.is_expired(100));
        assert!(session.is_expired(101));
    }
}
