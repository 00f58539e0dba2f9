use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Article, Category, Comment, User};

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ProfileResponse {
    pub bio: String,
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub profile: ProfileResponse,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AuthResponse {
    pub access: String,
    pub user: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub category: CategoryResponse,
    pub author: UserResponse,
    pub likes: i64,
    pub views: i64,
    pub created_at: String,
}

/// Detail reads additionally carry the article's comment tree.
#[derive(Deserialize, Serialize, Debug)]
pub struct ArticleDetailResponse {
    #[serde(flatten)]
    pub article: ArticleResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub article: i64,
    pub parent: Option<i64>,
    pub content: String,
    pub author: UserResponse,
    pub likes: i64,
    pub liked: bool,
    pub created_at: String,
    pub replies: Vec<CommentResponse>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Paginated<T> {
    pub count: i64,
    pub results: Vec<T>,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            username,
            email,
            is_staff,
            bio,
            image,
            ..
        }: User,
    ) -> Self {
        UserResponse {
            id,
            username,
            email,
            is_staff,
            profile: ProfileResponse {
                bio: bio.unwrap_or_default(),
                image,
            },
        }
    }
}

impl CategoryResponse {
    pub fn new(Category { id, name }: Category) -> Self {
        CategoryResponse { id, name }
    }
}

impl ArticleResponse {
    pub fn new(
        Article {
            id,
            title,
            content,
            thumbnail,
            views,
            created_at,
            category_id,
            category_name,
            author_id,
            author_username,
            author_email,
            author_is_staff,
            author_bio,
            author_image,
            like_count,
        }: Article,
    ) -> Self {
        ArticleResponse {
            id,
            title,
            content,
            thumbnail,
            category: CategoryResponse {
                id: category_id,
                name: category_name,
            },
            author: UserResponse {
                id: author_id,
                username: author_username,
                email: author_email,
                is_staff: author_is_staff,
                profile: ProfileResponse {
                    bio: author_bio.unwrap_or_default(),
                    image: author_image,
                },
            },
            likes: like_count,
            views,
            created_at: created_at.to_string(),
        }
    }
}

impl CommentResponse {
    pub fn new(
        Comment {
            id,
            article_id,
            parent_id,
            content,
            created_at,
            author_id,
            author_username,
            author_email,
            author_is_staff,
            author_bio,
            author_image,
            like_count,
            liked,
        }: Comment,
        replies: Vec<CommentResponse>,
    ) -> Self {
        CommentResponse {
            id,
            article: article_id,
            parent: parent_id,
            content,
            author: UserResponse {
                id: author_id,
                username: author_username,
                email: author_email,
                is_staff: author_is_staff,
                profile: ProfileResponse {
                    bio: author_bio.unwrap_or_default(),
                    image: author_image,
                },
            },
            likes: like_count,
            liked,
            created_at: created_at.to_string(),
            replies,
        }
    }
}

/// Assembles reply trees for the given root comments out of a flat batch of
/// rows. Children are found through a parent-id index and the walk uses an
/// explicit stack, so thread depth never grows the call stack. A row whose
/// parent chain loops back on itself is simply dropped from the output.
pub fn build_comment_trees(comments: Vec<Comment>, roots: &[i64]) -> Vec<CommentResponse> {
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut by_id: HashMap<i64, Comment> = HashMap::new();
    for comment in comments {
        if let Some(parent_id) = comment.parent_id {
            children.entry(parent_id).or_default().push(comment.id);
        }
        by_id.insert(comment.id, comment);
    }
    // Replies read oldest-first inside a thread.
    for ids in children.values_mut() {
        ids.sort_unstable();
    }

    let mut done: HashMap<i64, CommentResponse> = HashMap::new();
    let mut visited: HashSet<i64> = HashSet::new();
    let mut stack: Vec<(i64, bool)> = roots.iter().rev().map(|id| (*id, false)).collect();

    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            let comment = match by_id.remove(&id) {
                Some(comment) => comment,
                None => continue,
            };
            let replies = children
                .get(&id)
                .map(|ids| ids.iter().filter_map(|child| done.remove(child)).collect())
                .unwrap_or_default();
            done.insert(id, CommentResponse::new(comment, replies));
        } else {
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            if let Some(ids) = children.get(&id) {
                for child in ids.iter().rev() {
                    stack.push((*child, false));
                }
            }
        }
    }

    roots.iter().filter_map(|id| done.remove(id)).collect()
}
