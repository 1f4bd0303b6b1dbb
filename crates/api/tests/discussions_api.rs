//! HTTP-level tests for gated discussions, threaded comments, reviews and
//! reactions.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_admin, create_member, delete_auth, get_auth, post_json_auth,
    put_json_auth, token,
};
use serde_json::json;
use sqlx::PgPool;
use bookclub_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use bookclub_core::types::DbId;
use bookclub_db::models::book::CreateBook;
use bookclub_db::repositories::{BookRepo, DiscussionRepo, ProgressRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_book(pool: &PgPool) -> DbId {
    BookRepo::create(
        pool,
        &CreateBook {
            title: "Beloved".to_string(),
            author: "Toni Morrison".to_string(),
            description: None,
            cover_url: None,
            page_count: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn create_question(pool: &PgPool, admin_token: &str, book_id: DbId, breakpoint: i32) -> DbId {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/books/{book_id}/discussions"),
        admin_token,
        json!({ "question": format!("What happens by {breakpoint}%?"), "breakpoint": breakpoint }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn post_comment(
    pool: &PgPool,
    user_token: &str,
    discussion_id: DbId,
    body: serde_json::Value,
) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/v1/discussions/{discussion_id}/comments"),
        user_token,
        body,
    )
    .await
}

// ---------------------------------------------------------------------------
// Discussions and comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_breakpoint_is_validated(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let book_id = new_book(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        &format!("/api/v1/books/{book_id}/discussions"),
        &token(admin.id, ROLE_ADMIN),
        json!({ "question": "Too early?", "breakpoint": 0 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_locked_question_hides_text_and_refuses_comments(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let member = create_member(&pool, "reader").await;
    let book_id = new_book(&pool).await;
    let q = create_question(&pool, &token(admin.id, ROLE_ADMIN), book_id, 50).await;
    let auth = token(member.id, ROLE_MEMBER);
    ProgressRepo::record(&pool, member.id, book_id, 30).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(app, &format!("/api/v1/books/{book_id}/discussions"), &auth).await,
    )
    .await;
    assert_eq!(json["data"][0]["is_unlocked"], false);
    assert!(json["data"][0].get("question").is_none());

    let response = post_comment(&pool, &auth, q, json!({ "content": "Spoilers!" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DISCUSSION_LOCKED");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/discussions/{q}/comments"), &auth).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_thread_and_first_comment_badge(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let alice = create_member(&pool, "alice").await;
    let bob = create_member(&pool, "bob").await;
    let book_id = new_book(&pool).await;
    let q = create_question(&pool, &token(admin.id, ROLE_ADMIN), book_id, 25).await;
    for user in [alice.id, bob.id] {
        ProgressRepo::record(&pool, user, book_id, 25).await.unwrap();
    }

    let alice_auth = token(alice.id, ROLE_MEMBER);
    let response = post_comment(&pool, &alice_auth, q, json!({ "content": "  Loved it  " })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["comment"]["content"], "Loved it");
    let badges: Vec<&str> = json["data"]["new_badges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b.as_str().unwrap())
        .collect();
    assert!(badges.contains(&"FIRST_COMMENT"));
    let root_id = json["data"]["comment"]["id"].as_i64().unwrap();

    let bob_auth = token(bob.id, ROLE_MEMBER);
    let response = post_comment(
        &pool,
        &bob_auth,
        q,
        json!({ "content": "Me too", "parent_id": root_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let json =
        body_json(get_auth(app, &format!("/api/v1/discussions/{q}/comments"), &bob_auth).await)
            .await;
    let threads = json["data"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["author_name"], "alice");
    assert_eq!(threads[0]["replies"][0]["content"], "Me too");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reply_must_stay_in_discussion(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let member = create_member(&pool, "reader").await;
    let admin_token = token(admin.id, ROLE_ADMIN);
    let book_id = new_book(&pool).await;
    let first = create_question(&pool, &admin_token, book_id, 10).await;
    let second = create_question(&pool, &admin_token, book_id, 20).await;
    ProgressRepo::record(&pool, member.id, book_id, 50).await.unwrap();
    let auth = token(member.id, ROLE_MEMBER);

    let json = body_json(post_comment(&pool, &auth, first, json!({ "content": "Hi" })).await).await;
    let parent = json["data"]["comment"]["id"].as_i64().unwrap();

    let response = post_comment(
        &pool,
        &auth,
        second,
        json!({ "content": "Wrong place", "parent_id": parent }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_discussion(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let admin_token = token(admin.id, ROLE_ADMIN);
    let book_id = new_book(&pool).await;
    let q = create_question(&pool, &admin_token, book_id, 10).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/discussions/{q}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(DiscussionRepo::find_by_id(&pool, q).await.unwrap().is_none());

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/discussions/{q}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Reviews and reactions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_upsert_and_reactions(pool: PgPool) {
    let author = create_member(&pool, "author").await;
    let fan = create_member(&pool, "fan").await;
    let book_id = new_book(&pool).await;
    let author_auth = token(author.id, ROLE_MEMBER);
    let fan_auth = token(fan.id, ROLE_MEMBER);
    let uri = format!("/api/v1/books/{book_id}/reviews");

    let app = common::build_test_app(pool.clone());
    let response =
        put_json_auth(app, &uri, &author_auth, json!({ "rating": 6, "content": "Great" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    put_json_auth(app, &uri, &author_auth, json!({ "rating": 3, "content": "Fine" })).await;
    let app = common::build_test_app(pool.clone());
    let json = body_json(
        put_json_auth(app, &uri, &author_auth, json!({ "rating": 5, "content": "Great" })).await,
    )
    .await;
    let review_id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["rating"], 5);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, &uri, &fan_auth).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let reactions = format!("/api/v1/reviews/{review_id}/reactions");

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, &reactions, &author_auth, json!({ "reaction_type": "LIKE" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "self-reaction");

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, &reactions, &fan_auth, json!({ "reaction_type": "SHRUG" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "unknown type");

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, &reactions, &fan_auth, json!({ "reaction_type": "helpful" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first_id = body_json(response).await["data"]["reaction"]["id"].clone();

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, &reactions, &fan_auth, json!({ "reaction_type": "HELPFUL" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["reaction"]["id"], first_id);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("{reactions}/HELPFUL"), &fan_auth).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("{reactions}/HELPFUL"), &fan_auth).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        format!("You have no HELPFUL reaction on review {review_id}")
    );
}
