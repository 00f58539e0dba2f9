use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser,
    data_formats::{
        build_comment_trees, CommentQueryParams, CommentResponse, CreateCommentRequest,
        UpdateCommentRequest,
    },
    db_helpers::{
        create_comment_in_db, delete_comment_in_db, get_comment_by_id_in_db,
        get_comment_thread_in_db, list_comments_in_db, update_comment_in_db,
    },
    errors::RequestError,
    JsonResponse,
};

use super::{require_user, JsonResult};

pub async fn create_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<JsonResponse<CommentResponse>, RequestError> {
    let user = require_user(&pool, &maybe_user).await?;
    if request.content.trim().is_empty() {
        return Err(RequestError::Validation(
            "Comment content must not be empty",
        ));
    }

    let comment = create_comment_in_db(&pool, user.id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::new(comment, vec![])),
    ))
}

/// Flat page filtered by article and/or author, newest-first. Replies are
/// expanded on detail reads only; no filter yields an empty list.
pub async fn list_comments(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Query(CommentQueryParams { article, author }): Query<CommentQueryParams>,
) -> JsonResult<Vec<CommentResponse>> {
    if article.is_none() && author.is_none() {
        return Ok(Json(vec![]));
    }

    let comments = list_comments_in_db(&pool, article, author, maybe_user.get_id()).await?;
    Ok(Json(
        comments
            .into_iter()
            .map(|comment| CommentResponse::new(comment, vec![]))
            .collect(),
    ))
}

pub async fn get_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(comment_id): Path<i64>,
) -> JsonResult<CommentResponse> {
    let thread = get_comment_thread_in_db(&pool, comment_id, maybe_user.get_id()).await?;
    let comment = build_comment_trees(thread, &[comment_id])
        .into_iter()
        .next()
        .ok_or(RequestError::NotFound("Comment not found"))?;
    Ok(Json(comment))
}

pub async fn update_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(comment_id): Path<i64>,
    Json(UpdateCommentRequest { content }): Json<UpdateCommentRequest>,
) -> JsonResult<CommentResponse> {
    let user = require_user(&pool, &maybe_user).await?;
    let comment = get_comment_by_id_in_db(&pool, comment_id, Some(user.id))
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    if comment.author_id != user.id && !user.is_staff {
        return Err(RequestError::Forbidden(
            "You don't have permission to edit this comment",
        ));
    }
    if content.trim().is_empty() {
        return Err(RequestError::Validation(
            "Comment content must not be empty",
        ));
    }

    update_comment_in_db(&pool, comment_id, &content).await?;
    let comment = get_comment_by_id_in_db(&pool, comment_id, Some(user.id))
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    Ok(Json(CommentResponse::new(comment, vec![])))
}

pub async fn delete_comment(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let user = require_user(&pool, &maybe_user).await?;
    let comment = get_comment_by_id_in_db(&pool, comment_id, Some(user.id))
        .await?
        .ok_or(RequestError::NotFound("Comment not found"))?;
    if comment.author_id != user.id && !user.is_staff {
        return Err(RequestError::Forbidden(
            "You don't have permission to delete this comment",
        ));
    }

    delete_comment_in_db(&pool, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
