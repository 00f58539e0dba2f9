use axum::http::{StatusCode, Uri};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser, db_helpers::get_user_by_id, errors::RequestError, models::User,
};

mod article_handlers;
mod category_handlers;
mod comment_handlers;
mod like_handlers;
mod user_handlers;

pub use article_handlers::*;
pub use category_handlers::*;
pub use comment_handlers::*;
pub use like_handlers::*;
pub use user_handlers::*;

pub(crate) type JsonResult<T> = Result<axum::Json<T>, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    )
}

// ----------------- Access Control -----------------

/// Resolves the caller to an active account. Anonymous or unknown callers
/// get 401, suspended accounts get 403.
pub(crate) async fn require_user(
    pool: &SqlitePool,
    maybe_user: &MaybeUser,
) -> Result<User, RequestError> {
    let id = maybe_user
        .get_id()
        .ok_or(RequestError::NotAuthorized("Authentication required"))?;
    let user = get_user_by_id(pool, id)
        .await?
        .ok_or(RequestError::NotAuthorized("Authentication required"))?;
    if !user.is_active {
        return Err(RequestError::Forbidden("Account suspended"));
    }
    Ok(user)
}

pub(crate) async fn require_staff(
    pool: &SqlitePool,
    maybe_user: &MaybeUser,
) -> Result<User, RequestError> {
    let user = require_user(pool, maybe_user).await?;
    if !user.is_staff {
        return Err(RequestError::Forbidden("Staff privileges required"));
    }
    Ok(user)
}
