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
        build_comment_trees, ArticleDetailResponse, ArticleQueryParams, ArticleResponse,
        CreateArticleRequest, Paginated, UpdateArticleRequest,
    },
    db_helpers::{
        create_article_in_db, delete_article_in_db, get_article_by_id_in_db,
        get_comments_for_article_in_db, increment_article_views_in_db, list_articles_in_db,
        update_article_in_db,
    },
    errors::RequestError,
    JsonResponse,
};

use super::{require_user, JsonResult};

pub async fn list_articles(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<ArticleQueryParams>,
) -> JsonResult<Paginated<ArticleResponse>> {
    let (limit, offset) = params.limit_offset();
    let (count, articles) =
        list_articles_in_db(&pool, params.search, params.category, limit, offset).await?;
    Ok(Json(Paginated {
        count,
        results: articles.into_iter().map(ArticleResponse::new).collect(),
    }))
}

pub async fn create_article(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<JsonResponse<ArticleResponse>, RequestError> {
    let user = require_user(&pool, &maybe_user).await?;
    if request.title.trim().is_empty() || request.content.trim().is_empty() {
        return Err(RequestError::Validation("title and content are required"));
    }

    let article = create_article_in_db(&pool, user.id, request).await?;
    Ok((StatusCode::CREATED, Json(ArticleResponse::new(article))))
}

pub async fn get_article(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(article_id): Path<i64>,
) -> JsonResult<ArticleDetailResponse> {
    // Counted before the read so the returned representation reflects it.
    increment_article_views_in_db(&pool, article_id).await?;

    let article = get_article_by_id_in_db(&pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;

    let comments = get_comments_for_article_in_db(&pool, article_id, maybe_user.get_id()).await?;
    let roots: Vec<i64> = comments
        .iter()
        .filter(|comment| comment.parent_id.is_none())
        .map(|comment| comment.id)
        .collect();
    let comments = build_comment_trees(comments, &roots);

    Ok(Json(ArticleDetailResponse {
        article: ArticleResponse::new(article),
        comments,
    }))
}

pub async fn update_article(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(article_id): Path<i64>,
    Json(request): Json<UpdateArticleRequest>,
) -> JsonResult<ArticleResponse> {
    let user = require_user(&pool, &maybe_user).await?;
    let article = get_article_by_id_in_db(&pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if article.author_id != user.id && !user.is_staff {
        return Err(RequestError::Forbidden(
            "You don't have permission to edit this article",
        ));
    }

    let article = update_article_in_db(&pool, article_id, request).await?;
    Ok(Json(ArticleResponse::new(article)))
}

pub async fn delete_article(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(article_id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let user = require_user(&pool, &maybe_user).await?;
    let article = get_article_by_id_in_db(&pool, article_id)
        .await?
        .ok_or(RequestError::NotFound("Article not found"))?;
    if article.author_id != user.id && !user.is_staff {
        return Err(RequestError::Forbidden(
            "You don't have permission to delete this article",
        ));
    }

    delete_article_in_db(&pool, article_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
