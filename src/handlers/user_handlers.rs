use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use sqlx::SqlitePool;

use crate::{
    authentication::{get_jwt_token, hash_password_argon2, verify_password_argon2, MaybeUser},
    data_formats::{
        AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UpdateProfileRequest,
        UserResponse,
    },
    db_helpers::{get_user_by_username, insert_user, suspend_user_in_db, update_profile_in_db},
    errors::RequestError,
    JsonResponse,
};

use super::{require_staff, require_user, JsonResult};

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(mut request): Json<RegisterRequest>,
) -> Result<JsonResponse<AuthResponse>, RequestError> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(RequestError::Validation(
            "username, email and password are required",
        ));
    }

    request.password = hash_password_argon2(request.password)
        .await
        .map_err(|_| RequestError::ServerError)?;

    let user = insert_user(&pool, &request).await.map_err(|e| {
        if let RequestError::DatabaseError(sqlx::Error::Database(e)) = &e {
            if e.message().contains("UNIQUE constraint failed") {
                return RequestError::Validation("Username or email already taken");
            }
        }
        e
    })?;

    let access = get_jwt_token(user.id).map_err(|_| RequestError::ServerError)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access,
            user: UserResponse::new(user),
        }),
    ))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<AuthResponse> {
    let user = get_user_by_username(&pool, &request.username)
        .await?
        .ok_or(RequestError::NotAuthorized("Invalid username or password"))?;

    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::ServerError)?;
    if !is_password_correct {
        return Err(RequestError::NotAuthorized("Invalid username or password"));
    }
    if !user.is_active {
        return Err(RequestError::Forbidden("Account suspended"));
    }

    let access = get_jwt_token(user.id).map_err(|_| RequestError::ServerError)?;
    Ok(Json(AuthResponse {
        access,
        user: UserResponse::new(user),
    }))
}

pub async fn get_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<UserResponse> {
    let user = require_user(&pool, &maybe_user).await?;
    Ok(Json(UserResponse::new(user)))
}

pub async fn update_profile(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<UpdateProfileRequest>,
) -> JsonResult<UserResponse> {
    let user = require_user(&pool, &maybe_user).await?;
    let updated = update_profile_in_db(&pool, user.id, request).await?;
    Ok(Json(UserResponse::new(updated)))
}

pub async fn suspend_user(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(user_id): Path<i64>,
) -> JsonResult<MessageResponse> {
    require_staff(&pool, &maybe_user).await?;
    suspend_user_in_db(&pool, user_id).await?;
    tracing::info!("User {} suspended", user_id);
    Ok(Json(MessageResponse {
        message: "User suspended".to_string(),
    }))
}
