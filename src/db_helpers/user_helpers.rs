use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{RegisterRequest, UpdateProfileRequest},
    errors::RequestError,
    models::User,
};

use super::{get_user_by_id, QueryBuilder};

/// Inserts the user row and its profile row in one transaction, so the
/// "every user has exactly one profile" invariant holds from the start.
/// `user.password` must already be hashed by the caller.
pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO users (username, email, password)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, bio, image)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(&user.bio)
    .bind(&user.image)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    match get_user_by_id(pool, user_id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::ServerError),
    }
}

pub async fn update_profile_in_db(
    pool: &SqlitePool,
    user_id: i64,
    UpdateProfileRequest { bio, image }: UpdateProfileRequest,
) -> Result<User, RequestError> {
    let built = QueryBuilder::new("UPDATE profiles SET ", ", ")
        .add_field("bio", bio)
        .add_field("image", image)
        .add_clause(" WHERE user_id = ?", user_id.to_string())
        .build();

    if let Some((query, params)) = built {
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.execute(pool).await?;
    }

    match get_user_by_id(pool, user_id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

/// Deactivates the account in place. Reversible, unlike deletion; the login
/// and token paths both reject inactive users.
pub async fn suspend_user_in_db(pool: &SqlitePool, user_id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    Ok(())
}
