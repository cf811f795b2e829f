use sqlx::PgPool;

use crate::{
    data_formats::{CreateUserRequest, UpdateUserRequest},
    errors::RequestError,
    models::User,
};

const USER_COLUMNS: &str =
    "id, name, email, registered_at, is_verified_author, is_admin, avatar_url, password_hash";

pub async fn list_users_in_db(pool: &PgPool) -> Result<Vec<User>, RequestError> {
    let query = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    let users = sqlx::query_as::<_, User>(&query).fetch_all(pool).await?;
    Ok(users)
}

pub async fn get_user_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn insert_user(
    pool: &PgPool,
    request: &CreateUserRequest,
    password_hash: Option<&str>,
) -> Result<User, RequestError> {
    let query = format!(
        "INSERT INTO users (name, email, is_verified_author, avatar_url, password_hash)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&query)
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.is_verified_author)
        .bind(&request.avatar_url)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

pub async fn update_user_in_db(
    pool: &PgPool,
    id: i32,
    request: &UpdateUserRequest,
) -> Result<User, RequestError> {
    let query = format!(
        "UPDATE users SET name = $1, is_verified_author = $2, avatar_url = $3
         WHERE id = $4
         RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&query)
        .bind(&request.name)
        .bind(request.is_verified_author)
        .bind(&request.avatar_url)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    user.ok_or(RequestError::NotFound("User not found"))
}

/// Relies on `ON DELETE CASCADE` to drop the user's news and comments.
pub async fn delete_user_in_db(pool: &PgPool, id: i32) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    Ok(())
}
