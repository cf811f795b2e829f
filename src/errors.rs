use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

#[derive(Debug)]
pub enum RequestError {
    Validation(&'static str),
    Conflict(&'static str),
    NotAuthorized(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    Upstream(&'static str),
    DatabaseError(sqlx::Error),
    CacheError(redis::RedisError),
    ServerError,
}

#[derive(serde::Serialize)]
pub struct RequestErrorJson {
    detail: String,
}

impl RequestErrorJson {
    pub fn new(detail: &str) -> RequestErrorJson {
        RequestErrorJson {
            detail: detail.to_string(),
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl From<redis::RedisError> for RequestError {
    fn from(value: redis::RedisError) -> Self {
        Self::CacheError(value)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(_: reqwest::Error) -> Self {
        Self::Upstream("Identity provider request failed")
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Validation(_) | RequestError::Conflict(_) => StatusCode::BAD_REQUEST,
            RequestError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RequestError::DatabaseError(_)
            | RequestError::CacheError(_)
            | RequestError::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            RequestError::Validation(message)
            | RequestError::Conflict(message)
            | RequestError::NotAuthorized(message)
            | RequestError::Forbidden(message)
            | RequestError::NotFound(message)
            | RequestError::Upstream(message) => message,
            RequestError::DatabaseError(_)
            | RequestError::CacheError(_)
            | RequestError::ServerError => "Internal Server Error",
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            RequestError::DatabaseError(e) => error!("Database error: {e}"),
            RequestError::CacheError(e) => error!("Cache error: {e}"),
            _ => {}
        }
        let body = RequestErrorJson::new(self.detail());
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(
            RequestError::Validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::Conflict("dup").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::NotAuthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RequestError::Forbidden("not yours").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RequestError::NotFound("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::Upstream("github down").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn internal_errors_never_leak_details() {
        assert_eq!(
            RequestError::DatabaseError(sqlx::Error::RowNotFound).detail(),
            "Internal Server Error"
        );
        assert_eq!(RequestError::ServerError.detail(), "Internal Server Error");
    }
}
