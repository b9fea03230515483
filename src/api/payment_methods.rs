use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::db::AppState;
use crate::models::payment_method::{self, Entity as PaymentMethod, PaymentMethodDto};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentMethodRequest {
    pub name: String,
    pub description: Option<String>,
    pub qr_code: Option<String>,
    pub account_details: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// GET /api/purchases/payment-methods - active methods, public so the
/// purchase modal can show them before login completes
pub async fn list_payment_methods(State(state): State<AppState>) -> impl IntoResponse {
    match PaymentMethod::find()
        .filter(payment_method::Column::IsActive.eq(true))
        .all(&state.conn)
        .await
    {
        Ok(methods) => {
            let dtos: Vec<PaymentMethodDto> =
                methods.into_iter().map(PaymentMethodDto::from).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// POST /api/purchases/payment-methods (admin)
pub async fn create_payment_method(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreatePaymentMethodRequest>,
) -> impl IntoResponse {
    if !claims.is_admin() {
        return super::forbidden();
    }

    let account_details = payload
        .account_details
        .map(|v| v.to_string())
        .unwrap_or_else(|| "{}".to_owned());

    let new_method = payment_method::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        qr_code: Set(payload.qr_code),
        account_details: Set(account_details),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    match new_method.insert(&state.conn).await {
        Ok(model) => (StatusCode::CREATED, Json(PaymentMethodDto::from(model))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
