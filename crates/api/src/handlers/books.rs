//! Handlers for the book catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use bookclub_core::book::{validate_page_count, validate_reading_month, validate_required_text};
use bookclub_core::error::CoreError;
use bookclub_core::types::DbId;
use bookclub_db::models::book::{Book, CreateBook, UpdateBook};
use bookclub_db::models::status::BookStatus;
use bookclub_db::repositories::BookRepo;
use bookclub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /books`.
#[derive(Debug, Deserialize)]
pub struct BookListParams {
    /// Status name filter (`draft`, `nominated`, ...).
    pub status: Option<String>,
}

/// Load a book or fail with 404.
pub(crate) async fn ensure_book_exists(pool: &DbPool, id: DbId) -> AppResult<Book> {
    BookRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id,
        }))
}

/// GET /api/v1/books
pub async fn list_books(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BookListParams>,
) -> AppResult<impl IntoResponse> {
    let status_id = params
        .status
        .as_deref()
        .map(BookStatus::from_name)
        .transpose()?
        .map(BookStatus::id);

    let books = BookRepo::list(&state.pool, status_id).await?;
    Ok(Json(DataResponse { data: books }))
}

/// GET /api/v1/books/{id}
pub async fn get_book(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let book = ensure_book_exists(&state.pool, book_id).await?;
    Ok(Json(DataResponse { data: book }))
}

/// POST /api/v1/books
///
/// Create a book in Draft status. Admin only.
pub async fn create_book(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateBook>,
) -> AppResult<impl IntoResponse> {
    validate_required_text(&input.title, "title")?;
    validate_required_text(&input.author, "author")?;
    validate_page_count(input.page_count)?;

    let book = BookRepo::create(&state.pool, &input).await?;

    tracing::info!(book_id = book.id, user_id = admin.user_id, "Book created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: book })))
}

/// PUT /api/v1/books/{id}
///
/// Partial update. Admin only.
pub async fn update_book(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
    Json(input): Json<UpdateBook>,
) -> AppResult<impl IntoResponse> {
    if let Some(title) = &input.title {
        validate_required_text(title, "title")?;
    }
    if let Some(author) = &input.author {
        validate_required_text(author, "author")?;
    }
    if let Some(month) = &input.reading_month {
        validate_reading_month(month)?;
    }
    validate_page_count(input.page_count)?;
    let status_id = input
        .status
        .as_deref()
        .map(BookStatus::from_name)
        .transpose()?
        .map(BookStatus::id);

    let book = BookRepo::update(&state.pool, book_id, &input, status_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: book_id,
        }))?;

    tracing::info!(book_id, user_id = admin.user_id, "Book updated");

    Ok(Json(DataResponse { data: book }))
}
