use sqlx::PgPool;

use crate::{
    data_formats::{CreateNewsRequest, UpdateNewsRequest},
    errors::RequestError,
    models::News,
};

const NEWS_COLUMNS: &str = "id, title, content, published_at, cover_url, author_id";

/// Most recent first, ties broken by higher id.
pub async fn list_news_in_db(pool: &PgPool) -> Result<Vec<News>, RequestError> {
    let query = format!(
        "SELECT {} FROM news ORDER BY published_at DESC, id DESC",
        NEWS_COLUMNS
    );
    let news = sqlx::query_as::<_, News>(&query).fetch_all(pool).await?;
    Ok(news)
}

pub async fn get_news_by_id(pool: &PgPool, id: i32) -> Result<Option<News>, RequestError> {
    let query = format!("SELECT {} FROM news WHERE id = $1", NEWS_COLUMNS);
    let news = sqlx::query_as::<_, News>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(news)
}

pub async fn insert_news(pool: &PgPool, request: &CreateNewsRequest) -> Result<News, RequestError> {
    let query = format!(
        "INSERT INTO news (title, content, author_id, cover_url)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        NEWS_COLUMNS
    );
    let news = sqlx::query_as::<_, News>(&query)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.author_id)
        .bind(&request.cover_url)
        .fetch_one(pool)
        .await?;
    Ok(news)
}

pub async fn update_news_in_db(
    pool: &PgPool,
    id: i32,
    request: &UpdateNewsRequest,
) -> Result<News, RequestError> {
    let query = format!(
        "UPDATE news SET title = $1, content = $2, cover_url = $3
         WHERE id = $4
         RETURNING {}",
        NEWS_COLUMNS
    );
    let news = sqlx::query_as::<_, News>(&query)
        .bind(&request.title)
        .bind(&request.content)
        .bind(&request.cover_url)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    news.ok_or(RequestError::NotFound("News not found"))
}

/// Relies on `ON DELETE CASCADE` to drop the item's comments.
pub async fn delete_news_in_db(pool: &PgPool, id: i32) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM news WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("News not found"));
    }
    Ok(())
}
