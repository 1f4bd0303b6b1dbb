//! HTTP-level tests for poll creation, voting and closing.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_admin, create_member, delete_auth, get_auth, post_auth, post_json_auth,
    put_json_auth, token,
};
use serde_json::json;
use sqlx::PgPool;
use bookclub_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use bookclub_core::types::DbId;
use bookclub_db::models::book::CreateBook;
use bookclub_db::models::status::BookStatus;
use bookclub_db::repositories::{BookRepo, PollRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_book(pool: &PgPool, title: &str) -> DbId {
    BookRepo::create(
        pool,
        &CreateBook {
            title: title.to_string(),
            author: "Various".to_string(),
            description: None,
            cover_url: None,
            page_count: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Create an open poll through the API and return its id.
async fn create_open_poll(pool: &PgPool, admin_token: &str, book_ids: &[DbId]) -> DbId {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/polls",
        admin_token,
        json!({
            "title": "Next month's pick",
            "start_date": (Utc::now() - Duration::hours(1)).to_rfc3339(),
            "end_date": (Utc::now() + Duration::days(7)).to_rfc3339(),
            "for_month": "2026-11",
            "book_ids": book_ids,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn vote(pool: &PgPool, user_token: &str, poll_id: DbId, book_id: DbId) -> StatusCode {
    let app = common::build_test_app(pool.clone());
    put_json_auth(
        app,
        &format!("/api/v1/polls/{poll_id}/vote"),
        user_token,
        json!({ "book_id": book_id }),
    )
    .await
    .status()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_poll_validates_input(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let book = new_book(&pool, "Solo").await;
    let auth = token(admin.id, ROLE_ADMIN);
    let start = Utc::now();

    let cases = [
        json!({ "title": "One book", "start_date": start, "end_date": start + Duration::days(1),
                "for_month": "2026-11", "book_ids": [book] }),
        json!({ "title": "Backwards", "start_date": start, "end_date": start - Duration::days(1),
                "for_month": "2026-11", "book_ids": [book, book + 1] }),
        json!({ "title": "Bad month", "start_date": start, "end_date": start + Duration::days(1),
                "for_month": "2026-13", "book_ids": [book, book + 1] }),
        json!({ "title": "Missing book", "start_date": start, "end_date": start + Duration::days(1),
                "for_month": "2026-11", "book_ids": [book, 999_999] }),
    ];

    for body in cases {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, "/api/v1/polls", &auth, body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vote_change_and_detail(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let member = create_member(&pool, "voter").await;
    let a = new_book(&pool, "A").await;
    let b = new_book(&pool, "B").await;
    let poll_id = create_open_poll(&pool, &token(admin.id, ROLE_ADMIN), &[a, b]).await;
    let auth = token(member.id, ROLE_MEMBER);

    let nominated = BookRepo::find_by_id(&pool, a).await.unwrap().unwrap();
    assert_eq!(nominated.status_id, BookStatus::Nominated.id());

    assert_eq!(vote(&pool, &auth, poll_id, a).await, StatusCode::OK);
    assert_eq!(vote(&pool, &auth, poll_id, b).await, StatusCode::OK);
    assert_eq!(vote(&pool, &auth, poll_id, b).await, StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, &format!("/api/v1/polls/{poll_id}"), &auth).await).await;
    let candidates = json["data"]["candidates"].as_array().unwrap();
    assert_eq!(candidates[0]["book_id"], a);
    assert_eq!(candidates[0]["vote_count"], 0);
    assert_eq!(candidates[1]["book_id"], b);
    assert_eq!(candidates[1]["vote_count"], 1);
    assert_eq!(json["data"]["my_vote"]["book_id"], b);
    assert_eq!(PollRepo::count_votes(&pool, poll_id).await.unwrap(), 1);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/polls/{poll_id}/vote"), &auth).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/polls/{poll_id}/vote"), &auth).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("You have no vote in poll {poll_id}"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vote_for_non_candidate_is_precondition(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let member = create_member(&pool, "voter").await;
    let a = new_book(&pool, "A").await;
    let b = new_book(&pool, "B").await;
    let outsider = new_book(&pool, "Outsider").await;
    let poll_id = create_open_poll(&pool, &token(admin.id, ROLE_ADMIN), &[a, b]).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/polls/{poll_id}/vote"),
        &token(member.id, ROLE_MEMBER),
        json!({ "book_id": outsider }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "NOT_A_CANDIDATE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_close_schedules_winner_and_blocks_votes(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let admin_token = token(admin.id, ROLE_ADMIN);
    let a = new_book(&pool, "A").await;
    let b = new_book(&pool, "B").await;
    let poll_id = create_open_poll(&pool, &admin_token, &[a, b]).await;

    for name in ["v1", "v2"] {
        let voter = create_member(&pool, name).await;
        vote(&pool, &token(voter.id, ROLE_MEMBER), poll_id, b).await;
    }
    let late = create_member(&pool, "late").await;
    vote(&pool, &token(late.id, ROLE_MEMBER), poll_id, a).await;

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/polls/{poll_id}/close"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["winner"]["id"], b);
    assert_eq!(json["data"]["winner"]["reading_month"], "2026-11");
    assert_eq!(json["data"]["poll"]["is_active"], false);

    let loser = BookRepo::find_by_id(&pool, a).await.unwrap().unwrap();
    assert_eq!(loser.status_id, BookStatus::Draft.id());

    // Votes after closing are refused, and closing again is refused.
    let status = vote(&pool, &token(late.id, ROLE_MEMBER), poll_id, b).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/polls/{poll_id}/close"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "POLL_CLOSED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_member_cannot_close_poll(pool: PgPool) {
    let admin = create_admin(&pool, "boss").await;
    let member = create_member(&pool, "voter").await;
    let a = new_book(&pool, "A").await;
    let b = new_book(&pool, "B").await;
    let poll_id = create_open_poll(&pool, &token(admin.id, ROLE_ADMIN), &[a, b]).await;

    let app = common::build_test_app(pool);
    let response = post_auth(
        app,
        &format!("/api/v1/polls/{poll_id}/close"),
        &token(member.id, ROLE_MEMBER),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
