use chrono::NaiveDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// One article row joined with its author, category and like count. The
/// list/detail queries produce this shape directly so handlers never issue
/// follow-up lookups per row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub views: i64,
    pub created_at: NaiveDateTime,
    pub category_id: i64,
    pub category_name: String,
    pub author_id: i64,
    pub author_username: String,
    pub author_email: String,
    pub author_is_staff: bool,
    pub author_bio: Option<String>,
    pub author_image: Option<String>,
    pub like_count: i64,
}

/// One comment row joined with its author, like count, and whether the
/// requesting user has liked it. `parent_id` links the thread tree.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author_id: i64,
    pub author_username: String,
    pub author_email: String,
    pub author_is_staff: bool,
    pub author_bio: Option<String>,
    pub author_image: Option<String>,
    pub like_count: i64,
    pub liked: bool,
}

/// A like targets exactly one article or one comment, never both. The
/// variant is constructed once at the request boundary so the rest of the
/// code never sees the two-nullable-column shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Article(i64),
    Comment(i64),
}
