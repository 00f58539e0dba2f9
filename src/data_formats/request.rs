use serde::{Deserialize, Serialize};

use crate::{errors::RequestError, models::LikeTarget};

// ----------------- User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub image: Option<String>,
}

// ----------------- Category Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateCategoryRequest {
    pub name: String,
}

// ----------------- Article Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
    pub category_id: Option<i64>,
}

// ----------------- Comment Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateCommentRequest {
    pub content: String,
    pub article_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateCommentRequest {
    pub content: String,
}

// ----------------- Like Requests -----------------
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct LikeRequest {
    pub article_id: Option<i64>,
    pub comment_id: Option<i64>,
}

impl LikeRequest {
    /// Exactly one of the two targets must be named.
    pub fn target(&self) -> Result<LikeTarget, RequestError> {
        match (self.article_id, self.comment_id) {
            (Some(article_id), None) => Ok(LikeTarget::Article(article_id)),
            (None, Some(comment_id)) => Ok(LikeTarget::Comment(comment_id)),
            _ => Err(RequestError::Validation(
                "Provide exactly one of article_id or comment_id",
            )),
        }
    }
}
