pub mod books;
pub mod comments;
pub mod discussions;
pub mod health;
pub mod polls;
pub mod reviews;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /books                                   list, create (admin)
/// /books/{id}                              get, update (admin)
/// /books/{id}/progress                     get, update
/// /books/{id}/discussions                  list, create (admin)
/// /books/{id}/reviews                      list, upsert
///
/// /discussions/{id}                        delete (admin)
/// /discussions/{id}/comments               list, post
///
/// /comments/{id}/reactions                 add
/// /comments/{id}/reactions/{type}          remove
/// /reviews/{id}/reactions                  add
/// /reviews/{id}/reactions/{type}           remove
///
/// /polls                                   list, create (admin)
/// /polls/{id}                              get
/// /polls/{id}/vote                         cast, remove
/// /polls/{id}/close                        close (admin)
///
/// /users/me/progress                       list
/// /users/me/streak                         get
/// /users/me/badges                         evaluate + list
/// /users/me/badges/{id}/pin                pin, unpin
/// /users/{id}/badges                       list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Book catalog and per-book reader state.
        .nest("/books", books::router())
        // Discussion questions and their comment threads.
        .nest("/discussions", discussions::router())
        // Reactions on comments and reviews.
        .nest("/comments", comments::router())
        .nest("/reviews", reviews::router())
        // Book-selection polls.
        .nest("/polls", polls::router())
        // Caller-scoped views and other members' badges.
        .nest("/users", users::router())
}
