use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::{ensure_owner, AuthUser, VerifiedAuthor},
    cache::{cache_delete, cache_get, cache_set, news_key, NEWS_CACHE_TTL_SECS},
    data_formats::{validate_news_content, CreateNewsRequest, NewsResponse, UpdateNewsRequest},
    db_helpers::{
        delete_news_in_db, get_news_by_id, get_user_by_id, insert_news, list_news_in_db,
        update_news_in_db,
    },
    errors::RequestError,
    AppState,
};

pub async fn list_news(
    Extension(state): Extension<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Vec<NewsResponse>>, RequestError> {
    let news = list_news_in_db(&state.db).await?;
    Ok(Json(news.into_iter().map(NewsResponse::from).collect()))
}

/// Read-through: cache hit short-circuits the relational store, a miss (or
/// an unreadable entry) falls back to it and repopulates the cache.
pub async fn get_news(
    Extension(state): Extension<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<NewsResponse>, RequestError> {
    let mut redis = state.redis.clone();
    if let Some(cached) = cache_get::<NewsResponse>(&mut redis, &news_key(id)).await? {
        return Ok(Json(cached));
    }
    let news = get_news_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("News not found"))?;
    let response = NewsResponse::from(news);
    cache_set(&mut redis, &news_key(id), &response, NEWS_CACHE_TTL_SECS).await?;
    Ok(Json(response))
}

pub async fn create_news(
    Extension(state): Extension<Arc<AppState>>,
    VerifiedAuthor(_user): VerifiedAuthor,
    Json(request): Json<CreateNewsRequest>,
) -> Result<Json<NewsResponse>, RequestError> {
    validate_news_content(&request.content)?;
    if get_user_by_id(&state.db, request.author_id)
        .await?
        .is_none()
    {
        return Err(RequestError::NotFound("Author not found"));
    }
    let news = insert_news(&state.db, &request).await?;
    let response = NewsResponse::from(news);

    let mut redis = state.redis.clone();
    cache_set(
        &mut redis,
        &news_key(response.id),
        &response,
        NEWS_CACHE_TTL_SECS,
    )
    .await?;
    Ok(Json(response))
}

pub async fn update_news(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateNewsRequest>,
) -> Result<Json<NewsResponse>, RequestError> {
    validate_news_content(&request.content)?;
    let news = get_news_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("News not found"))?;
    ensure_owner(news.author_id, &user)?;

    let news = update_news_in_db(&state.db, id, &request).await?;

    // Invalidate before responding so a follow-up read never sees the old row.
    let mut redis = state.redis.clone();
    cache_delete(&mut redis, &news_key(id)).await?;
    Ok(Json(news.into()))
}

pub async fn delete_news(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, RequestError> {
    let news = get_news_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("News not found"))?;
    ensure_owner(news.author_id, &user)?;

    delete_news_in_db(&state.db, id).await?;

    let mut redis = state.redis.clone();
    cache_delete(&mut redis, &news_key(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
