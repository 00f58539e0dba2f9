use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Category};

pub async fn list_categories_in_db(pool: &SqlitePool) -> Result<Vec<Category>, RequestError> {
    let result =
        sqlx::query_as::<Sqlite, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(result)
}

pub async fn insert_category_in_db(
    pool: &SqlitePool,
    name: &str,
) -> Result<Category, RequestError> {
    let result = sqlx::query_as::<Sqlite, Category>(
        r#"
        INSERT INTO categories (name)
        VALUES ($1)
        RETURNING id, name
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(result)
}
