use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::JsonResponse;

#[derive(Debug)]
pub enum RequestError {
    Validation(&'static str),
    NotAuthorized(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    detail: String,
}

impl ErrorResponse {
    pub fn new(detail: &str) -> ErrorResponse {
        ErrorResponse {
            detail: detail.to_string(),
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn to_json_response(&self) -> JsonResponse<ErrorResponse> {
        let (status_code, json) = match self {
            RequestError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
            }
            RequestError::NotAuthorized(message) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::new(message))
            }
            RequestError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, ErrorResponse::new(message))
            }
            RequestError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new(message))
            }
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json))
    }
}
