use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

// ----------------- Auth Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct OAuthCallbackParams {
    pub code: String,
}

// ----------------- User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_verified_author: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateUserRequest {
    pub name: String,
    pub is_verified_author: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// ----------------- News Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: serde_json::Value,
    pub author_id: i32,
    #[serde(default)]
    pub cover_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateNewsRequest {
    pub title: String,
    pub content: serde_json::Value,
    #[serde(default)]
    pub cover_url: Option<String>,
}

// ----------------- Comment Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateCommentRequest {
    pub text: String,
    pub author_id: i32,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateCommentRequest {
    pub text: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_password(password: &str) -> Result<(), RequestError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RequestError::Validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// News content is a structured blob, but it must at least be a JSON object.
pub fn validate_news_content(content: &serde_json::Value) -> Result<(), RequestError> {
    if !content.is_object() {
        return Err(RequestError::Validation("content must be a JSON object"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn news_content_must_be_an_object() {
        assert!(validate_news_content(&json!({"blocks": []})).is_ok());
        assert!(validate_news_content(&json!("plain string")).is_err());
        assert!(validate_news_content(&json!([1, 2, 3])).is_err());
        assert!(validate_news_content(&json!(null)).is_err());
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let request: CreateUserRequest =
            serde_json::from_str(r#"{"name": "Ada", "email": "ada@example.com"}"#).unwrap();
        assert!(!request.is_verified_author);
        assert!(request.avatar_url.is_none());
    }
}
