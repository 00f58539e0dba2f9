use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use sqlx::SqlitePool;

use crate::{
    authentication::MaybeUser,
    data_formats::{CategoryResponse, CreateCategoryRequest},
    db_helpers::{insert_category_in_db, list_categories_in_db},
    errors::RequestError,
    JsonResponse,
};

use super::{require_staff, JsonResult};

pub async fn list_categories(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> JsonResult<Vec<CategoryResponse>> {
    let categories = list_categories_in_db(&pool).await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::new).collect(),
    ))
}

pub async fn create_category(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<JsonResponse<CategoryResponse>, RequestError> {
    require_staff(&pool, &maybe_user).await?;
    if request.name.trim().is_empty() {
        return Err(RequestError::Validation("Category name must not be empty"));
    }

    let category = insert_category_in_db(&pool, &request.name)
        .await
        .map_err(|e| {
            if let RequestError::DatabaseError(sqlx::Error::Database(e)) = &e {
                if e.message().contains("UNIQUE constraint failed") {
                    return RequestError::Validation("Category already exists");
                }
            }
            e
        })?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::new(category))))
}
