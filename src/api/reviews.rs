use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use crate::auth::Claims;
use crate::db::AppState;
use crate::models::book::Entity as Book;
use crate::models::review::{self, Entity as Review, ReviewDto};
use crate::models::user::{self, Entity as User};

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// GET /api/books/:id/reviews - reviews for a book with reviewer names
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
) -> impl IntoResponse {
    let reviews = match Review::find()
        .filter(review::Column::BookId.eq(book_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.conn)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let user_ids: Vec<i32> = reviews.iter().map(|r| r.user_id).collect();
    let mut user_names: HashMap<i32, String> = HashMap::new();
    if !user_ids.is_empty() {
        match User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&state.conn)
            .await
        {
            Ok(users) => {
                for u in users {
                    user_names.insert(u.id, u.full_name);
                }
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response();
            }
        }
    }

    let dtos: Vec<ReviewDto> = reviews
        .into_iter()
        .map(|r| ReviewDto {
            id: r.id,
            book_id: r.book_id,
            user_id: r.user_id,
            user_name: user_names.get(&r.user_id).cloned(),
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        })
        .collect();

    (StatusCode::OK, Json(dtos)).into_response()
}

/// POST /api/books/:id/reviews - one review per user per book
pub async fn create_review(
    State(state): State<AppState>,
    claims: Claims,
    Path(book_id): Path<i32>,
    Json(payload): Json<CreateReviewRequest>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    if !(1..=5).contains(&payload.rating) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Rating must be between 1 and 5" })),
        )
            .into_response();
    }

    match Book::find_by_id(book_id).one(&state.conn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Book not found" })),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    }

    let new_review = review::ActiveModel {
        book_id: Set(book_id),
        user_id: Set(user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    match new_review.insert(&state.conn).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) if e.to_string().contains("UNIQUE constraint failed") => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "You have already reviewed this book" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
