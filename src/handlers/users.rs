use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    data_formats::{CreateUserRequest, UpdateUserRequest, UserResponse},
    db_helpers::{
        delete_user_in_db, get_user_by_email, get_user_by_id, insert_user, list_users_in_db,
        update_user_in_db,
    },
    errors::RequestError,
    AppState,
};

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, RequestError> {
    let users = list_users_in_db(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, RequestError> {
    let user = get_user_by_id(&state.db, id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    Ok(Json(user.into()))
}

pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, RequestError> {
    if get_user_by_email(&state.db, &request.email).await?.is_some() {
        return Err(RequestError::Conflict("Email already exists"));
    }
    let user = insert_user(&state.db, &request, None).await?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, RequestError> {
    let user = update_user_in_db(&state.db, id, &request).await?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, RequestError> {
    delete_user_in_db(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
