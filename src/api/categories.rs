use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::db::AppState;
use crate::models::category::{self, Entity as Category};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    match Category::find()
        .order_by_asc(category::Column::Name)
        .all(&state.conn)
        .await
    {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateCategoryRequest>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Category name cannot be empty" })),
        )
            .into_response();
    }

    let new_category = category::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    match new_category.insert(&state.conn).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) if e.to_string().contains("UNIQUE constraint failed") => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "A category with this name already exists" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
