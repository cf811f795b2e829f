use sqlx::PgPool;

use crate::{
    data_formats::{CreateCommentRequest, UpdateCommentRequest},
    errors::RequestError,
    models::Comment,
};

const COMMENT_COLUMNS: &str = "id, text, published_at, news_id, author_id";

/// Oldest first, conversation order.
pub async fn list_comments_for_news_in_db(
    pool: &PgPool,
    news_id: i32,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "SELECT {} FROM comments WHERE news_id = $1 ORDER BY published_at",
        COMMENT_COLUMNS
    );
    let comments = sqlx::query_as::<_, Comment>(&query)
        .bind(news_id)
        .fetch_all(pool)
        .await?;
    Ok(comments)
}

pub async fn get_comment_by_id(pool: &PgPool, id: i32) -> Result<Option<Comment>, RequestError> {
    let query = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(comment)
}

pub async fn insert_comment(
    pool: &PgPool,
    news_id: i32,
    request: &CreateCommentRequest,
) -> Result<Comment, RequestError> {
    let query = format!(
        "INSERT INTO comments (text, news_id, author_id)
         VALUES ($1, $2, $3)
         RETURNING {}",
        COMMENT_COLUMNS
    );
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(&request.text)
        .bind(news_id)
        .bind(request.author_id)
        .fetch_one(pool)
        .await?;
    Ok(comment)
}

pub async fn update_comment_in_db(
    pool: &PgPool,
    id: i32,
    request: &UpdateCommentRequest,
) -> Result<Comment, RequestError> {
    let query = format!(
        "UPDATE comments SET text = $1 WHERE id = $2 RETURNING {}",
        COMMENT_COLUMNS
    );
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(&request.text)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    comment.ok_or(RequestError::NotFound("Comment not found"))
}

pub async fn delete_comment_in_db(pool: &PgPool, id: i32) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(())
}
