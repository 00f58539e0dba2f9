use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::CreateCommentRequest, errors::RequestError, models::Comment};

// $1 is the requesting user (or NULL when anonymous) and only feeds the
// `liked` flag, same trick the article queries use for per-caller fields.
const COMMENT_QUERY: &str = r#"
    SELECT comments.id         AS id,
           comments.article_id AS article_id,
           comments.parent_id  AS parent_id,
           comments.content    AS content,
           comments.created_at AS created_at,
           comments.author_id  AS author_id,
           users.username      AS author_username,
           users.email         AS author_email,
           users.is_staff      AS author_is_staff,
           profiles.bio        AS author_bio,
           profiles.image      AS author_image,
           (SELECT Count(*)
            FROM   likes
            WHERE  likes.comment_id = comments.id) AS like_count,
           EXISTS (SELECT 1
                   FROM   likes
                   WHERE  likes.comment_id = comments.id
                     AND  likes.user_id = $1)      AS liked
    FROM   comments
           JOIN users
             ON users.id = comments.author_id
           LEFT JOIN profiles
                  ON profiles.user_id = users.id
"#;

pub async fn create_comment_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreateCommentRequest {
        content,
        article_id,
        parent_id,
    }: CreateCommentRequest,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    let article_exists =
        sqlx::query_scalar::<Sqlite, bool>("SELECT EXISTS (SELECT 1 FROM articles WHERE id = $1)")
            .bind(article_id)
            .fetch_one(&mut *tx)
            .await?;
    if !article_exists {
        return Err(RequestError::Validation("Article not found"));
    }

    if let Some(parent_id) = parent_id {
        let parent_article = sqlx::query_scalar::<Sqlite, i64>(
            "SELECT article_id FROM comments WHERE id = $1",
        )
        .bind(parent_id)
        .fetch_optional(&mut *tx)
        .await?;
        match parent_article {
            None => return Err(RequestError::Validation("Parent comment not found")),
            Some(parent_article) if parent_article != article_id => {
                return Err(RequestError::Validation(
                    "Parent comment belongs to a different article",
                ))
            }
            Some(_) => (),
        }
    }

    let comment_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO comments (article_id, author_id, content, parent_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(article_id)
    .bind(author_id)
    .bind(&content)
    .bind(parent_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    match get_comment_by_id_in_db(pool, comment_id, Some(author_id)).await? {
        Some(comment) => Ok(comment),
        None => Err(RequestError::ServerError),
    }
}

pub async fn get_comment_by_id_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    user_id: Option<i64>,
) -> Result<Option<Comment>, RequestError> {
    let query = format!("{COMMENT_QUERY} WHERE comments.id = $2");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(user_id)
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Every comment on the article a comment belongs to, in one query. The
/// handler carves the requested subtree out of this batch.
pub async fn get_comment_thread_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    user_id: Option<i64>,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_QUERY}
         WHERE comments.article_id = (SELECT article_id FROM comments WHERE id = $2)"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(user_id)
        .bind(comment_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn get_comments_for_article_in_db(
    pool: &SqlitePool,
    article_id: i64,
    user_id: Option<i64>,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_QUERY}
         WHERE comments.article_id = $2
         ORDER BY comments.created_at DESC, comments.id DESC"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(user_id)
        .bind(article_id)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn list_comments_in_db(
    pool: &SqlitePool,
    article: Option<i64>,
    author: Option<i64>,
    user_id: Option<i64>,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{COMMENT_QUERY}
         WHERE  ( $2 IS NULL
                   OR comments.article_id = $2 )
           AND  ( $3 IS NULL
                   OR comments.author_id = $3 )
         ORDER BY comments.created_at DESC, comments.id DESC"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(user_id)
        .bind(article)
        .bind(author)
        .fetch_all(pool)
        .await?;
    Ok(result)
}

pub async fn update_comment_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    content: &str,
) -> Result<(), RequestError> {
    let result = sqlx::query("UPDATE comments SET content = $1 WHERE id = $2")
        .bind(content)
        .bind(comment_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(())
}

pub async fn delete_comment_in_db(pool: &SqlitePool, comment_id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    Ok(())
}
