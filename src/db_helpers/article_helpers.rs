use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::{CreateArticleRequest, UpdateArticleRequest};
use crate::errors::RequestError;
use crate::models::Article;

use super::QueryBuilder;

const ARTICLE_QUERY: &str = r#"
    SELECT articles.id          AS id,
           articles.title       AS title,
           articles.content     AS content,
           articles.thumbnail   AS thumbnail,
           articles.views       AS views,
           articles.created_at  AS created_at,
           articles.category_id AS category_id,
           categories.name      AS category_name,
           articles.author_id   AS author_id,
           users.username       AS author_username,
           users.email          AS author_email,
           users.is_staff       AS author_is_staff,
           profiles.bio         AS author_bio,
           profiles.image       AS author_image,
           (SELECT Count(*)
            FROM   likes
            WHERE  likes.article_id = articles.id) AS like_count
    FROM   articles
           JOIN users
             ON users.id = articles.author_id
           JOIN categories
             ON categories.id = articles.category_id
           LEFT JOIN profiles
                  ON profiles.user_id = users.id
"#;

const ARTICLE_FILTER: &str = r#"
    WHERE  ( $1 IS NULL
              OR articles.title LIKE '%' || $1 || '%' )
      AND  ( $2 IS NULL
              OR articles.category_id = $2 )
"#;

pub async fn list_articles_in_db(
    pool: &SqlitePool,
    search: Option<String>,
    category: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<Article>), RequestError> {
    let count_query = format!("SELECT COUNT(*) FROM articles {ARTICLE_FILTER}");
    let count = sqlx::query_scalar::<Sqlite, i64>(&count_query)
        .bind(&search)
        .bind(category)
        .fetch_one(pool)
        .await?;

    let query = format!(
        "{ARTICLE_QUERY} {ARTICLE_FILTER}
         ORDER BY articles.created_at DESC, articles.id DESC
         LIMIT $3 OFFSET $4"
    );
    let articles = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(&search)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((count, articles))
}

pub async fn get_article_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Article>, RequestError> {
    let query = format!("{ARTICLE_QUERY} WHERE articles.id = $1");
    let result = sqlx::query_as::<Sqlite, Article>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Single atomic read-modify-write; concurrent readers never lose counts.
pub async fn increment_article_views_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<(), RequestError> {
    let result = sqlx::query("UPDATE articles SET views = views + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }
    Ok(())
}

pub async fn create_article_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreateArticleRequest {
        title,
        content,
        category_id,
        thumbnail,
    }: CreateArticleRequest,
) -> Result<Article, RequestError> {
    ensure_category_exists(pool, category_id).await?;

    let article_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO articles (title, content, thumbnail, category_id, author_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&title)
    .bind(&content)
    .bind(&thumbnail)
    .bind(category_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    match get_article_by_id_in_db(pool, article_id).await? {
        Some(article) => Ok(article),
        None => Err(RequestError::ServerError),
    }
}

pub async fn update_article_in_db(
    pool: &SqlitePool,
    article_id: i64,
    UpdateArticleRequest {
        title,
        content,
        thumbnail,
        category_id,
    }: UpdateArticleRequest,
) -> Result<Article, RequestError> {
    if let Some(category_id) = category_id {
        ensure_category_exists(pool, category_id).await?;
    }

    let built = QueryBuilder::new("UPDATE articles SET ", ", ")
        .add_field("title", title)
        .add_field("content", content)
        .add_field("thumbnail", thumbnail)
        .add_field("category_id", category_id.map(|id| id.to_string()))
        .add_clause(" WHERE id = ?", article_id.to_string())
        .build();

    if let Some((query, params)) = built {
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.execute(pool).await?;
    }

    match get_article_by_id_in_db(pool, article_id).await? {
        Some(article) => Ok(article),
        None => Err(RequestError::NotFound("Article not found")),
    }
}

pub async fn delete_article_in_db(pool: &SqlitePool, article_id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(article_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Article not found"));
    }
    Ok(())
}

async fn ensure_category_exists(pool: &SqlitePool, category_id: i64) -> Result<(), RequestError> {
    let exists = sqlx::query_scalar::<Sqlite, bool>(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)",
    )
    .bind(category_id)
    .fetch_one(pool)
    .await?;
    if !exists {
        return Err(RequestError::Validation("Category not found"));
    }
    Ok(())
}
