pub mod auth;
pub mod books;
pub mod categories;
pub mod health;
pub mod payment_methods;
pub mod progress;
pub mod purchases;
pub mod reviews;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::db::AppState;
use crate::services::ServiceError;

/// Map service failures onto HTTP statuses. Uniqueness violations
/// become 409 so the frontend can tell "already exists" from a bug.
pub(crate) fn error_response(e: ServiceError) -> Response {
    match e {
        ServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Resource not found" })),
        )
            .into_response(),
        ServiceError::Conflict(_) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Resource already exists" })),
        )
            .into_response(),
        ServiceError::InvalidState(msg) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        ServiceError::Database(msg) => {
            tracing::error!("Database error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

pub(crate) fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Admin privileges required" })),
    )
        .into_response()
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/token/refresh", post(auth::refresh_token))
        .route(
            "/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        // Catalog
        .route(
            "/books/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route("/books/purchased", get(books::purchased_books))
        // Reading progress
        .route(
            "/books/progress",
            get(progress::list_progress).post(progress::create_progress),
        )
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/cover", post(books::upload_cover))
        .route(
            "/books/:id/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/books/:id/progress",
            get(progress::get_progress).put(progress::update_progress),
        )
        // Purchases
        .route(
            "/purchases",
            get(purchases::list_purchases).post(purchases::create_purchase),
        )
        .route(
            "/purchases/payment-methods",
            get(payment_methods::list_payment_methods).post(payment_methods::create_payment_method),
        )
        .route("/purchases/statistics", get(purchases::statistics))
        .route("/purchases/:id", get(purchases::get_purchase))
        .route("/purchases/:id/approve", post(purchases::approve_purchase))
        .route("/purchases/:id/reject", post(purchases::reject_purchase))
        .with_state(state)
}
