use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::Claims;
use crate::db::AppState;
use crate::services::progress_service::{self, ProgressUpdate};

#[derive(Debug, Deserialize)]
pub struct CreateProgressRequest {
    pub book_id: i32,
    pub current_page: Option<i32>,
    pub bookmarks: Option<Vec<i32>>,
    pub completed: Option<bool>,
}

/// GET /api/books/progress - the caller's progress across all books
pub async fn list_progress(State(state): State<AppState>, claims: Claims) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match progress_service::list_for_user(&state.conn, user_id).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// POST /api/books/progress - start tracking a book
pub async fn create_progress(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateProgressRequest>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    let update = ProgressUpdate {
        current_page: payload.current_page,
        bookmarks: payload.bookmarks,
        completed: payload.completed,
    };

    match progress_service::create(&state.conn, user_id, payload.book_id, update).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// GET /api/books/:id/progress - get-or-create semantics: opening a
/// book for the first time starts it at page 1
pub async fn get_progress(
    State(state): State<AppState>,
    claims: Claims,
    Path(book_id): Path<i32>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match progress_service::get_or_create(&state.conn, user_id, book_id).await {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// PUT /api/books/:id/progress
pub async fn update_progress(
    State(state): State<AppState>,
    claims: Claims,
    Path(book_id): Path<i32>,
    Json(payload): Json<ProgressUpdate>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match progress_service::update(&state.conn, user_id, book_id, payload).await {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(e) => super::error_response(e),
    }
}
