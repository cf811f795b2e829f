use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Comment, News, RefreshSession, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub registered_at: NaiveDateTime,
    pub is_verified_author: bool,
    pub avatar_url: Option<String>,
}

/// Also the cached representation under `news:{id}`, so it derives
/// `Deserialize` for the read-through path.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewsResponse {
    pub id: i32,
    pub title: String,
    pub content: serde_json::Value,
    pub published_at: NaiveDateTime,
    pub author_id: i32,
    pub cover_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i32,
    pub text: String,
    pub published_at: NaiveDateTime,
    pub news_id: i32,
    pub author_id: i32,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SessionResponse {
    pub key: String,
    pub user_agent: String,
    pub created_at: i64,
    pub expires_at: i64,
}

#[derive(Serialize, Debug)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            registered_at: user.registered_at,
            is_verified_author: user.is_verified_author,
            avatar_url: user.avatar_url,
        }
    }
}

impl From<News> for NewsResponse {
    fn from(news: News) -> Self {
        NewsResponse {
            id: news.id,
            title: news.title,
            content: news.content,
            published_at: news.published_at,
            author_id: news.author_id,
            cover_url: news.cover_url,
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id,
            text: comment.text,
            published_at: comment.published_at,
            news_id: comment.news_id,
            author_id: comment.author_id,
        }
    }
}

impl SessionResponse {
    pub fn new(key: String, session: RefreshSession) -> Self {
        SessionResponse {
            key,
            user_agent: session.user_agent,
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn timestamps_serialize_as_iso_8601() {
        let response = NewsResponse {
            id: 1,
            title: "title".to_string(),
            content: json!({}),
            published_at: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
            author_id: 2,
            cover_url: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["published_at"], "2024-03-05T12:30:00");
    }

    #[test]
    fn cached_news_round_trips() {
        let response = NewsResponse {
            id: 9,
            title: "cached".to_string(),
            content: json!({"blocks": [{"kind": "text"}]}),
            published_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            author_id: 4,
            cover_url: Some("https://example.com/cover.png".to_string()),
        };
        let data = serde_json::to_string(&response).unwrap();
        let back: NewsResponse = serde_json::from_str(&data).unwrap();
        assert_eq!(back.id, 9);
        assert_eq!(back.content, response.content);
        assert_eq!(back.published_at, response.published_at);
    }
}
