use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::db::AppState;
use crate::models::book::{CreateBook, UpdateBook};
use crate::services::book_service::{self, BookFilter};

/// Query parameters for the catalog listing
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub category: Option<i32>,
    pub language: Option<String>,
    pub q: Option<String>,
    pub ordering: Option<String>,
}

/// Query parameters for the authenticated search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "List active books")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListBooksQuery>,
) -> impl IntoResponse {
    let filter = BookFilter {
        category: params.category,
        language: params.language,
        q: params.q,
        ordering: params.ordering,
    };

    match book_service::list_books(&state.conn, filter).await {
        Ok(books) => (StatusCode::OK, Json(books)).into_response(),
        Err(e) => super::error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateBook>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    match book_service::create_book(&state.conn, payload).await {
        Ok(model) => {
            tracing::info!("Book created: {} ({})", model.title, model.id);
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Book created successfully",
                    "book": crate::models::BookDto::from(model)
                })),
            )
                .into_response()
        }
        Err(e) => super::error_response(e),
    }
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match book_service::get_book(&state.conn, id).await {
        Ok(book) => (StatusCode::OK, Json(book)).into_response(),
        Err(e) => super::error_response(e),
    }
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    responses(
        (status = 200, description = "Book updated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBook>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    match book_service::update_book(&state.conn, id, payload).await {
        Ok(model) => (StatusCode::OK, Json(crate::models::BookDto::from(model))).into_response(),
        Err(e) => super::error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    match book_service::delete_book(&state.conn, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Book deleted successfully" })),
        )
            .into_response(),
        Err(e) => super::error_response(e),
    }
}

pub async fn search_books(
    State(state): State<AppState>,
    _claims: Claims,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    match book_service::search_books(&state.conn, params.q, params.category).await {
        Ok(books) => (StatusCode::OK, Json(books)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// Books from the caller's approved purchases
pub async fn purchased_books(State(state): State<AppState>, claims: Claims) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match book_service::purchased_books(&state.conn, user_id).await {
        Ok(books) => (StatusCode::OK, Json(books)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// Accept a multipart cover upload, store it under the media dir and
/// point the book at the new file.
pub async fn upload_cover(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    // The book must exist before we write anything to disk
    if let Err(e) = book_service::get_book(&state.conn, id).await {
        return super::error_response(e);
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("cover").to_string();
        let extension = original_name.rsplit('.').next().unwrap_or("png").to_string();

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Failed to read upload: {}", e) })),
                )
                    .into_response();
            }
        };

        if data.is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Uploaded file is empty" })),
            )
                .into_response();
        }

        let dir = std::path::Path::new(&state.media_dir).join("book_covers");
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Failed to create media dir: {}", e) })),
            )
                .into_response();
        }

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        if let Err(e) = tokio::fs::write(dir.join(&filename), &data).await {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Failed to store file: {}", e) })),
            )
                .into_response();
        }

        let cover_path = format!("/media/book_covers/{}", filename);
        let update = UpdateBook {
            cover_image: Some(cover_path.clone()),
            ..Default::default()
        };

        return match book_service::update_book(&state.conn, id, update).await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({ "cover_image": cover_path })),
            )
                .into_response(),
            Err(e) => super::error_response(e),
        };
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing 'file' field in multipart body" })),
    )
        .into_response()
}
