use sqlx::{Sqlite, SqlitePool};

use crate::models::User;

mod article_helpers;
mod category_helpers;
mod comment_helpers;
mod like_helpers;
mod user_helpers;

pub use article_helpers::*;
pub use category_helpers::*;
pub use comment_helpers::*;
pub use like_helpers::*;
pub use user_helpers::*;

/// Builds partial UPDATE statements out of optional request fields. All
/// params are bound as strings; SQLite column affinity converts numeric
/// values on write.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    seperator: &'static str,
    fields: usize,
}

impl QueryBuilder {
    fn new(initial: &str, seperator: &'static str) -> Self {
        Self {
            query: initial.to_owned(),
            params: vec![],
            seperator,
            fields: 0,
        }
    }

    fn add_field(mut self, column: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            if self.fields > 0 {
                self.query.push_str(self.seperator);
            }
            self.query.push_str(column);
            self.query.push_str(" = ?");
            self.params.push(value);
            self.fields += 1;
        }
        self
    }

    fn add_clause(mut self, clause: &str, value: String) -> Self {
        self.query.push_str(clause);
        self.params.push(value);
        self
    }

    /// None when no field was supplied, so callers can skip the round trip.
    fn build(self) -> Option<(String, Vec<String>)> {
        if self.fields == 0 {
            return None;
        }
        Some((self.query, self.params))
    }
}

// ----------------- Shared Lookups -----------------

const USER_QUERY: &str = r#"
    SELECT users.id         AS id,
           users.username   AS username,
           users.email      AS email,
           users.password   AS password,
           users.is_staff   AS is_staff,
           users.is_active  AS is_active,
           profiles.bio     AS bio,
           profiles.image   AS image,
           users.created_at AS created_at
    FROM   users
           LEFT JOIN profiles
                  ON profiles.user_id = users.id
"#;

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let query = format!("{USER_QUERY} WHERE users.id = $1");
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!("{USER_QUERY} WHERE users.username = $1");
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(username)
        .fetch_optional(pool)
        .await
}
