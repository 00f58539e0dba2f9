use blogapi::{get_random_free_port, init_db, make_router, run_app};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// Boots the app on a random free port against a throwaway database file
/// and waits until it answers the health check.
async fn spawn_app() -> (String, SqlitePool) {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let (port, addr) = get_random_free_port();
    let db_path = std::env::temp_dir().join(format!("blogapi-test-{port}.db"));
    let _ = std::fs::remove_file(&db_path);
    let db_url = format!("sqlite://{}", db_path.display());
    let pool = init_db(&db_url).await.expect("Failed to initialize test db");

    let app_pool = pool.clone();
    tokio::spawn(async move {
        run_app(make_router(), addr, app_pool)
            .await
            .expect("Server crashed");
    });

    let url = format!("http://localhost:{port}");
    let client = Client::new();
    for _ in 0..100 {
        if client.get(format!("{url}/check_health")).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    (url, pool)
}

async fn register(client: &Client, url: &str, username: &str) -> (String, i64) {
    let response = client
        .post(format!("{url}/api/register"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
            "bio": format!("bio of {username}"),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let token = body["access"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_i64().unwrap();
    (token, user_id)
}

async fn make_staff(pool: &SqlitePool, user_id: i64) {
    sqlx::query("UPDATE users SET is_staff = 1 WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

async fn create_category(client: &Client, url: &str, staff_token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{url}/api/categories"))
        .header("Authorization", format!("Token {staff_token}"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_article(
    client: &Client,
    url: &str,
    token: &str,
    title: &str,
    category_id: i64,
) -> i64 {
    let response = client
        .post(format!("{url}/api/articles"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "title": title,
            "content": "Some article content",
            "category_id": category_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_comment(
    client: &Client,
    url: &str,
    token: &str,
    article_id: i64,
    parent_id: Option<i64>,
    content: &str,
) -> i64 {
    let response = client
        .post(format!("{url}/api/comments"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "content": content,
            "article_id": article_id,
            "parent_id": parent_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

// ----------------- User & Auth -----------------

#[tokio::test]
async fn register_login_and_profile_flow() {
    let (url, _pool) = spawn_app().await;
    let client = Client::new();

    let (token, _) = register(&client, &url, "alice").await;

    // profile via the registration token
    let response = client
        .get(format!("{url}/api/profile"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["profile"]["bio"], "bio of alice");

    // login issues a fresh token
    let response = client
        .post(format!("{url}/api/login"))
        .json(&json!({ "username": "alice", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["access"].as_str().is_some());

    // wrong password
    let response = client
        .post(format!("{url}/api/login"))
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // anonymous profile read
    let response = client
        .get(format!("{url}/api/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (url, _pool) = spawn_app().await;
    let client = Client::new();

    register(&client, &url, "bob").await;
    let response = client
        .post(format!("{url}/api/register"))
        .json(&json!({
            "username": "bob",
            "email": "other@example.com",
            "password": "password123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_update_is_partial() {
    let (url, _pool) = spawn_app().await;
    let client = Client::new();
    let (token, _) = register(&client, &url, "carol").await;

    let response = client
        .put(format!("{url}/api/profile"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "image": "https://example.com/carol.png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    // untouched field survives
    assert_eq!(body["profile"]["bio"], "bio of carol");
    assert_eq!(body["profile"]["image"], "https://example.com/carol.png");
}

// ----------------- Categories -----------------

#[tokio::test]
async fn category_creation_is_staff_only() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "dave").await;

    let response = client
        .post(format!("{url}/api/categories"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "name": "Rust" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    make_staff(&pool, user_id).await;
    create_category(&client, &url, &token, "Rust").await;

    // list is public
    let response = client
        .get(format!("{url}/api/categories"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Rust");
}

// ----------------- Articles -----------------

#[tokio::test]
async fn article_list_filters_by_category_and_search() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "erin").await;
    make_staff(&pool, user_id).await;

    let c1 = create_category(&client, &url, &token, "Databases").await;
    let c2 = create_category(&client, &url, &token, "Networking").await;
    create_article(&client, &url, &token, "Sqlite internals", c1).await;

    // matching category
    let body: Value = client
        .get(format!("{url}/api/articles?category={c1}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["title"], "Sqlite internals");
    assert_eq!(body["results"][0]["category"]["id"], c1);

    // unrelated category
    let body: Value = client
        .get(format!("{url}/api/articles?category={c2}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 0);
    assert!(body["results"].as_array().unwrap().is_empty());

    // title substring search
    let body: Value = client
        .get(format!("{url}/api/articles?search=internals"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 1);

    let body: Value = client
        .get(format!("{url}/api/articles?search=zeppelin"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn article_reads_increment_view_counter() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "frank").await;
    make_staff(&pool, user_id).await;
    let category = create_category(&client, &url, &token, "Views").await;
    let article = create_article(&client, &url, &token, "Counting reads", category).await;

    for expected in 1..=3 {
        let body: Value = client
            .get(format!("{url}/api/articles/{article}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["views"], expected);
    }
}

#[tokio::test]
async fn article_update_requires_owner_or_staff() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (owner_token, owner_id) = register(&client, &url, "grace").await;
    let (other_token, _) = register(&client, &url, "henry").await;
    make_staff(&pool, owner_id).await;
    let category = create_category(&client, &url, &owner_token, "Ownership").await;
    let article = create_article(&client, &url, &owner_token, "Original title", category).await;

    // non-owner, non-staff
    let response = client
        .put(format!("{url}/api/articles/{article}"))
        .header("Authorization", format!("Token {other_token}"))
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // owner
    let response = client
        .put(format!("{url}/api/articles/{article}"))
        .header("Authorization", format!("Token {owner_token}"))
        .json(&json!({ "title": "Updated title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Updated title");

    // anonymous delete
    let response = client
        .delete(format!("{url}/api/articles/{article}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // owner delete
    let response = client
        .delete(format!("{url}/api/articles/{article}"))
        .header("Authorization", format!("Token {owner_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn article_with_unknown_category_is_rejected() {
    let (url, _pool) = spawn_app().await;
    let client = Client::new();
    let (token, _) = register(&client, &url, "iris").await;

    let response = client
        .post(format!("{url}/api/articles"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({
            "title": "Orphan",
            "content": "No category exists",
            "category_id": 999,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ----------------- Comments -----------------

#[tokio::test]
async fn comment_replies_form_a_tree() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "judy").await;
    make_staff(&pool, user_id).await;
    let category = create_category(&client, &url, &token, "Threads").await;
    let article = create_article(&client, &url, &token, "Discuss", category).await;

    let root = create_comment(&client, &url, &token, article, None, "top level").await;
    let reply1 = create_comment(&client, &url, &token, article, Some(root), "first reply").await;
    let reply2 = create_comment(&client, &url, &token, article, Some(root), "second reply").await;
    let nested = create_comment(&client, &url, &token, article, Some(reply1), "nested").await;

    // single comment read expands replies recursively
    let body: Value = client
        .get(format!("{url}/api/comments/{root}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let replies = body["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 2);
    let ids: Vec<i64> = replies.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert!(ids.contains(&reply1) && ids.contains(&reply2));
    let first = replies.iter().find(|r| r["id"] == reply1).unwrap();
    assert_eq!(first["replies"][0]["id"], nested);

    // article detail shows only roots at the top, children nested
    let body: Value = client
        .get(format!("{url}/api/articles/{article}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], root);
    assert_eq!(comments[0]["replies"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn comment_list_filters_by_article_and_author() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "kate").await;
    let (other_token, other_id) = register(&client, &url, "liam").await;
    make_staff(&pool, user_id).await;
    let category = create_category(&client, &url, &token, "Lists").await;
    let a1 = create_article(&client, &url, &token, "First", category).await;
    let a2 = create_article(&client, &url, &token, "Second", category).await;

    create_comment(&client, &url, &token, a1, None, "kate on first").await;
    create_comment(&client, &url, &other_token, a1, None, "liam on first").await;
    create_comment(&client, &url, &other_token, a2, None, "liam on second").await;

    let body: Value = client
        .get(format!("{url}/api/comments?article={a1}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body: Value = client
        .get(format!("{url}/api/comments?author={other_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body: Value = client
        .get(format!("{url}/api/comments?article={a2}&author={other_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);

    // no filter yields nothing
    let body: Value = client
        .get(format!("{url}/api/comments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn comment_create_validations() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "mona").await;
    make_staff(&pool, user_id).await;
    let category = create_category(&client, &url, &token, "Validation").await;
    let a1 = create_article(&client, &url, &token, "Alpha", category).await;
    let a2 = create_article(&client, &url, &token, "Beta", category).await;
    let on_a1 = create_comment(&client, &url, &token, a1, None, "on alpha").await;

    // unauthenticated
    let response = client
        .post(format!("{url}/api/comments"))
        .json(&json!({ "content": "anon", "article_id": a1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // missing article
    let response = client
        .post(format!("{url}/api/comments"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "content": "ghost", "article_id": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // empty content
    let response = client
        .post(format!("{url}/api/comments"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "content": "   ", "article_id": a1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // parent on a different article
    let response = client
        .post(format!("{url}/api/comments"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "content": "cross", "article_id": a2, "parent_id": on_a1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_edit_requires_owner_or_staff() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (owner_token, owner_id) = register(&client, &url, "nick").await;
    let (other_token, _) = register(&client, &url, "olga").await;
    let (staff_token, staff_id) = register(&client, &url, "pam").await;
    make_staff(&pool, owner_id).await;
    make_staff(&pool, staff_id).await;
    let category = create_category(&client, &url, &owner_token, "Moderation").await;
    let article = create_article(&client, &url, &owner_token, "Rules", category).await;
    let comment = create_comment(&client, &url, &owner_token, article, None, "original").await;

    // non-owner, non-staff edit fails and leaves the comment unchanged
    let response = client
        .put(format!("{url}/api/comments/{comment}"))
        .header("Authorization", format!("Token {other_token}"))
        .json(&json!({ "content": "defaced" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: Value = client
        .get(format!("{url}/api/comments/{comment}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["content"], "original");

    // non-owner, non-staff delete fails
    let response = client
        .delete(format!("{url}/api/comments/{comment}"))
        .header("Authorization", format!("Token {other_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // owner edit succeeds
    let response = client
        .put(format!("{url}/api/comments/{comment}"))
        .header("Authorization", format!("Token {owner_token}"))
        .json(&json!({ "content": "revised" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // staff delete succeeds even though staff is not the author
    let response = client
        .delete(format!("{url}/api/comments/{comment}"))
        .header("Authorization", format!("Token {staff_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ----------------- Likes -----------------

#[tokio::test]
async fn like_toggles_on_and_off() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "quinn").await;
    make_staff(&pool, user_id).await;
    let category = create_category(&client, &url, &token, "Likes").await;
    let article = create_article(&client, &url, &token, "Likeable", category).await;
    let comment = create_comment(&client, &url, &token, article, None, "like me").await;

    // article like toggles
    for (liked, likes) in [(true, 1), (false, 0), (true, 1)] {
        let body: Value = client
            .post(format!("{url}/api/like"))
            .header("Authorization", format!("Token {token}"))
            .json(&json!({ "article_id": article }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["liked"], liked);
        assert_eq!(body["likes"], likes);
    }

    // comment like is independent of the article like
    let body: Value = client
        .post(format!("{url}/api/like"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "comment_id": comment }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["liked"], true);

    let body: Value = client
        .get(format!("{url}/api/comments/{comment}"))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["likes"], 1);
    assert_eq!(body["liked"], true);
}

#[tokio::test]
async fn like_requires_exactly_one_target() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (token, user_id) = register(&client, &url, "rita").await;
    make_staff(&pool, user_id).await;
    let category = create_category(&client, &url, &token, "Targets").await;
    let article = create_article(&client, &url, &token, "Pick one", category).await;
    let comment = create_comment(&client, &url, &token, article, None, "or me").await;

    // both targets
    let response = client
        .post(format!("{url}/api/like"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "article_id": article, "comment_id": comment }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // neither target
    let response = client
        .post(format!("{url}/api/like"))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // anonymous
    let response = client
        .post(format!("{url}/api/like"))
        .json(&json!({ "article_id": article }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ----------------- Moderation -----------------

#[tokio::test]
async fn suspended_user_is_locked_out() {
    let (url, pool) = spawn_app().await;
    let client = Client::new();
    let (staff_token, staff_id) = register(&client, &url, "sara").await;
    let (victim_token, victim_id) = register(&client, &url, "tom").await;
    make_staff(&pool, staff_id).await;

    // non-staff cannot suspend
    let response = client
        .post(format!("{url}/api/users/{staff_id}/suspend"))
        .header("Authorization", format!("Token {victim_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // staff suspends
    let response = client
        .post(format!("{url}/api/users/{victim_id}/suspend"))
        .header("Authorization", format!("Token {staff_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User suspended");

    // existing token no longer works for writes
    let response = client
        .get(format!("{url}/api/profile"))
        .header("Authorization", format!("Token {victim_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // login is refused
    let response = client
        .post(format!("{url}/api/login"))
        .json(&json!({ "username": "tom", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // unknown user
    let response = client
        .post(format!("{url}/api/users/999/suspend"))
        .header("Authorization", format!("Token {staff_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
