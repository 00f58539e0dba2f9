use std::sync::Arc;

use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser,
    data_formats::{LikeRequest, LikeResponse},
    db_helpers::toggle_like_in_db,
};

use super::{require_user, JsonResult};

/// Toggle semantics: a like is created if absent and removed if present.
/// The response carries the resulting state so callers don't need a
/// follow-up read.
pub async fn toggle_like(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LikeRequest>,
) -> JsonResult<LikeResponse> {
    let user = require_user(&pool, &maybe_user).await?;
    let target = request.target()?;
    let (liked, likes) = toggle_like_in_db(&pool, user.id, target).await?;
    Ok(Json(LikeResponse { liked, likes }))
}
