use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::LikeTarget};

/// Toggles the caller's like on the target inside one transaction and
/// reports the resulting state: delete if a like exists, otherwise insert.
/// The UNIQUE (user, target) pairs in the schema mean a racing duplicate
/// insert lands on DO NOTHING instead of double-creating.
pub async fn toggle_like_in_db(
    pool: &SqlitePool,
    user_id: i64,
    target: LikeTarget,
) -> Result<(bool, i64), RequestError> {
    let (table, column, target_id) = match target {
        LikeTarget::Article(id) => ("articles", "article_id", id),
        LikeTarget::Comment(id) => ("comments", "comment_id", id),
    };

    let mut tx = pool.begin().await?;

    let exists_query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
    let target_exists = sqlx::query_scalar::<Sqlite, bool>(&exists_query)
        .bind(target_id)
        .fetch_one(&mut *tx)
        .await?;
    if !target_exists {
        return Err(RequestError::Validation("Like target not found"));
    }

    let delete_query = format!("DELETE FROM likes WHERE user_id = $1 AND {column} = $2");
    let deleted = sqlx::query(&delete_query)
        .bind(user_id)
        .bind(target_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let liked = if deleted == 0 {
        let insert_query = format!(
            "INSERT INTO likes (user_id, {column}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        );
        sqlx::query(&insert_query)
            .bind(user_id)
            .bind(target_id)
            .execute(&mut *tx)
            .await?;
        true
    } else {
        false
    };

    let count_query = format!("SELECT COUNT(*) FROM likes WHERE {column} = $1");
    let count = sqlx::query_scalar::<Sqlite, i64>(&count_query)
        .bind(target_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((liked, count))
}
