//! Integration tests for badge evaluation and pinning.

use assert_matches::assert_matches;
use sqlx::PgPool;
use bookclub_core::badges::BadgeType;
use bookclub_core::reaction::ReactionType;
use bookclub_core::types::DbId;
use bookclub_db::models::book::CreateBook;
use bookclub_db::models::reaction::ReactionTarget;
use bookclub_db::models::user::CreateUser;
use bookclub_db::repositories::{
    BadgeRepo, BookRepo, CommentRepo, ProgressRepo, ReactionRepo, ReviewRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, name: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            display_name: name.to_string(),
            email: format!("{name}@example.com"),
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_book(pool: &PgPool, title: &str) -> DbId {
    BookRepo::create(
        pool,
        &CreateBook {
            title: title.to_string(),
            author: "Author".to_string(),
            description: None,
            cover_url: None,
            page_count: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_award_is_idempotent(pool: PgPool) {
    let user = new_user(&pool, "ann").await;
    let book = new_book(&pool, "Dune").await;
    ProgressRepo::record(&pool, user, book, 100).await.unwrap();
    CommentRepo::create(&pool, user, book, None, None, "Loved it").await.unwrap();
    ReviewRepo::upsert(&pool, user, book, 5, "A classic").await.unwrap();

    let first = BadgeRepo::check_and_award(&pool, user).await.unwrap();
    assert_eq!(
        first,
        vec![
            BadgeType::FirstBook,
            BadgeType::FirstFinish,
            BadgeType::FirstComment,
            BadgeType::FirstReview,
        ]
    );
    let before = BadgeRepo::awarded_types(&pool, user).await.unwrap();

    let second = BadgeRepo::check_and_award(&pool, user).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(BadgeRepo::awarded_types(&pool, user).await.unwrap(), before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_evaluation_awards_once(pool: PgPool) {
    let user = new_user(&pool, "bob").await;
    let book = new_book(&pool, "Emma").await;
    ProgressRepo::record(&pool, user, book, 10).await.unwrap();

    let tasks = (0..4).map(|_| {
        let pool = pool.clone();
        tokio::spawn(async move { BadgeRepo::check_and_award(&pool, user).await })
    });
    let reported: usize = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap().len())
        .sum();
    assert_eq!(reported, 1);

    let rows = BadgeRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].badge_type_id, BadgeType::FirstBook.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reactions_received_count_across_comments_and_reviews(pool: PgPool) {
    let author = new_user(&pool, "author").await;
    let book = new_book(&pool, "Middlemarch").await;
    let comment = CommentRepo::create(&pool, author, book, None, None, "Thoughts")
        .await
        .unwrap();
    let review = ReviewRepo::upsert(&pool, author, book, 4, "Long but good").await.unwrap();

    for i in 0..5 {
        let fan = new_user(&pool, &format!("fan{i}")).await;
        for target in [ReactionTarget::Comment(comment.id), ReactionTarget::Review(review.id)] {
            ReactionRepo::add(&pool, fan, target, ReactionType::Helpful).await.unwrap();
            ReactionRepo::add(&pool, fan, target, ReactionType::Like).await.unwrap();
        }
    }

    let counters = BadgeRepo::counters(&pool, author).await.unwrap();
    assert_eq!(counters.helpful_received, 10);
    assert_eq!(counters.insightful_received, 0);
    assert_eq!(counters.comments, 1);
    assert_eq!(counters.reviews, 1);

    let earned = BadgeRepo::check_and_award(&pool, author).await.unwrap();
    assert!(earned.contains(&BadgeType::HelpfulHand));
    assert!(!earned.contains(&BadgeType::DeepThinker));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_streak_counter_reads_persisted_value(pool: PgPool) {
    let user = new_user(&pool, "cy").await;
    sqlx::query("UPDATE users SET current_streak = 12, longest_streak = 12 WHERE id = $1")
        .bind(user)
        .execute(&pool)
        .await
        .unwrap();

    let earned = BadgeRepo::check_and_award(&pool, user).await.unwrap();
    assert_eq!(earned, vec![BadgeType::Streak4, BadgeType::Streak12]);
}

// ---------------------------------------------------------------------------
// Pinning
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_one_badge_pinned(pool: PgPool) {
    let user = new_user(&pool, "dee").await;
    let book = new_book(&pool, "Beloved").await;
    ProgressRepo::record(&pool, user, book, 100).await.unwrap();
    BadgeRepo::check_and_award(&pool, user).await.unwrap();

    let awards = BadgeRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(awards.len(), 2);
    let (x, y) = (awards[0].id, awards[1].id);

    BadgeRepo::pin(&pool, user, x).await.unwrap().unwrap();
    let pinned = BadgeRepo::pin(&pool, user, y).await.unwrap().unwrap();
    assert!(pinned.is_pinned);

    let pinned_ids: Vec<DbId> = BadgeRepo::list_for_user(&pool, user)
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.is_pinned)
        .map(|b| b.id)
        .collect();
    assert_eq!(pinned_ids, vec![y]);

    let unpinned = BadgeRepo::unpin(&pool, user, y).await.unwrap().unwrap();
    assert!(!unpinned.is_pinned);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cannot_pin_someone_elses_badge(pool: PgPool) {
    let owner = new_user(&pool, "eli").await;
    let other = new_user(&pool, "fay").await;
    let book = new_book(&pool, "Persuasion").await;
    ProgressRepo::record(&pool, owner, book, 10).await.unwrap();
    BadgeRepo::check_and_award(&pool, owner).await.unwrap();
    let award = BadgeRepo::list_for_user(&pool, owner).await.unwrap()[0].id;

    assert_matches!(BadgeRepo::pin(&pool, other, award).await.unwrap(), None);
    assert_matches!(BadgeRepo::unpin(&pool, other, award).await.unwrap(), None);
    assert_matches!(BadgeRepo::pin(&pool, owner, 999_999).await.unwrap(), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_pins_leave_one_pinned(pool: PgPool) {
    let user = new_user(&pool, "gus").await;
    let book = new_book(&pool, "Hamlet").await;
    ProgressRepo::record(&pool, user, book, 100).await.unwrap();
    CommentRepo::create(&pool, user, book, None, None, "To be").await.unwrap();
    BadgeRepo::check_and_award(&pool, user).await.unwrap();
    let awards = BadgeRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(awards.len(), 3);

    let tasks = awards.iter().map(|award| {
        let pool = pool.clone();
        let award_id = award.id;
        tokio::spawn(async move { BadgeRepo::pin(&pool, user, award_id).await })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap().unwrap();
    }

    let pinned: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_badges WHERE user_id = $1 AND is_pinned",
    )
    .bind(user)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pinned, 1);
}
