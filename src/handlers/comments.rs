use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::{ensure_owner, AuthUser},
    data_formats::{CommentResponse, CreateCommentRequest, UpdateCommentRequest},
    db_helpers::{
        delete_comment_in_db, get_comment_by_id, get_news_by_id, get_user_by_id, insert_comment,
        list_comments_for_news_in_db, update_comment_in_db,
    },
    errors::RequestError,
    AppState,
};

pub async fn list_comments_for_news(
    Extension(state): Extension<Arc<AppState>>,
    _user: AuthUser,
    Path(news_id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, RequestError> {
    if get_news_by_id(&state.db, news_id).await?.is_none() {
        return Err(RequestError::NotFound("News not found"));
    }
    let comments = list_comments_for_news_in_db(&state.db, news_id).await?;
    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

pub async fn get_comment(
    Extension(state): Extension<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<CommentResponse>, RequestError> {
    let comment = get_comment_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    Ok(Json(comment.into()))
}

pub async fn create_comment(
    Extension(state): Extension<Arc<AppState>>,
    _user: AuthUser,
    Path(news_id): Path<i32>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<CommentResponse>, RequestError> {
    if get_news_by_id(&state.db, news_id).await?.is_none() {
        return Err(RequestError::NotFound("News not found"));
    }
    if get_user_by_id(&state.db, request.author_id)
        .await?
        .is_none()
    {
        return Err(RequestError::NotFound("User not found"));
    }
    let comment = insert_comment(&state.db, news_id, &request).await?;
    Ok(Json(comment.into()))
}

pub async fn update_comment(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, RequestError> {
    let comment = get_comment_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    ensure_owner(comment.author_id, &user)?;

    let comment = update_comment_in_db(&state.db, id, &request).await?;
    Ok(Json(comment.into()))
}

pub async fn delete_comment(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, RequestError> {
    let comment = get_comment_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    ensure_owner(comment.author_id, &user)?;

    delete_comment_in_db(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
