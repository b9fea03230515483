use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::auth::Claims;
use crate::db::AppState;
use crate::services::purchase_service::{self, CreatePurchase};

/// GET /api/purchases - admins see every purchase, users their own
pub async fn list_purchases(State(state): State<AppState>, claims: Claims) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match purchase_service::list_purchases(&state.conn, user_id, claims.is_admin()).await {
        Ok(purchases) => (StatusCode::OK, Json(purchases)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// POST /api/purchases - submit a purchase for manual approval
pub async fn create_purchase(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreatePurchase>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match purchase_service::create_purchase(&state.conn, user_id, payload).await {
        Ok(model) => {
            tracing::info!(
                "Purchase {} created by user {} for book {}",
                model.id,
                user_id,
                model.book_id
            );
            (StatusCode::CREATED, Json(model)).into_response()
        }
        Err(crate::services::ServiceError::Conflict(_)) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "You have already purchased this book" })),
        )
            .into_response(),
        Err(e) => super::error_response(e),
    }
}

pub async fn get_purchase(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match purchase_service::get_purchase(&state.conn, id, user_id, claims.is_admin()).await {
        Ok(purchase) => (StatusCode::OK, Json(purchase)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// POST /api/purchases/:id/approve - admin flips the status and the
/// row records who approved and when
pub async fn approve_purchase(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    let approver_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match purchase_service::approve_purchase(&state.conn, id, approver_id).await {
        Ok(model) => {
            tracing::info!("Purchase {} approved by admin {}", model.id, approver_id);
            (StatusCode::OK, Json(model)).into_response()
        }
        Err(e) => super::error_response(e),
    }
}

pub async fn reject_purchase(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    match purchase_service::reject_purchase(&state.conn, id).await {
        Ok(model) => (StatusCode::OK, Json(model)).into_response(),
        Err(e) => super::error_response(e),
    }
}

/// GET /api/purchases/statistics - admin dashboard numbers
pub async fn statistics(State(state): State<AppState>, claims: Claims) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    match purchase_service::statistics(&state.conn).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => super::error_response(e),
    }
}
