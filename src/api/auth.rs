use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{
    create_access_token, create_refresh_token, decode_token, hash_password, verify_password,
    Claims, TOKEN_TYPE_REFRESH,
};
use crate::db::AppState;
use crate::models::user::{self, Entity as User, Profile};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

fn token_pair(user: &user::Model) -> Result<(String, String), String> {
    let access = create_access_token(user.id, &user.role)?;
    let refresh = create_refresh_token(user.id, &user.role)?;
    Ok((access, refresh))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Password must be at least 8 characters" })),
        )
            .into_response();
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.conn)
        .await;

    match existing {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "A user with this email already exists" })),
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
        Ok(None) => {}
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e })),
            )
                .into_response();
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let new_user = user::ActiveModel {
        email: Set(payload.email),
        full_name: Set(payload.full_name),
        phone: Set(payload.phone),
        password_hash: Set(password_hash),
        role: Set("user".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_user.insert(&state.conn).await {
        Ok(model) => {
            tracing::info!("Registered new user: {}", model.email);
            match token_pair(&model) {
                Ok((access, refresh)) => (
                    StatusCode::CREATED,
                    Json(json!({
                        "user": Profile::from(model),
                        "access": access,
                        "refresh": refresh
                    })),
                )
                    .into_response(),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e })),
                )
                    .into_response(),
            }
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for {}", payload.email);

    let user = match User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.conn)
        .await
    {
        Ok(Some(u)) => u,
        // Same response for unknown email and bad password
        _ => {
            tracing::warn!("Login failed: unknown email {}", payload.email);
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => match token_pair(&user) {
            Ok((access, refresh)) => (
                StatusCode::OK,
                Json(json!({
                    "user": Profile::from(user),
                    "access": access,
                    "refresh": refresh
                })),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e })),
            )
                .into_response(),
        },
        _ => {
            tracing::warn!("Login failed: bad password for {}", user.email);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response()
        }
    }
}

/// Exchange a refresh token for a fresh access token
pub async fn refresh_token(Json(payload): Json<RefreshRequest>) -> impl IntoResponse {
    let claims = match decode_token(&payload.refresh) {
        Ok(c) => c,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid or expired refresh token" })),
            )
                .into_response();
        }
    };

    if claims.token_type != TOKEN_TYPE_REFRESH {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not a refresh token" })),
        )
            .into_response();
    }

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match create_access_token(user_id, &claims.role) {
        Ok(access) => (StatusCode::OK, Json(json!({ "access": access }))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e })),
        )
            .into_response(),
    }
}

/// Tokens are stateless; logout exists so clients have a uniform API.
/// There is no server-side blacklist.
pub async fn logout(Json(_payload): Json<RefreshRequest>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    )
}

pub async fn get_profile(State(state): State<AppState>, claims: Claims) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    match User::find_by_id(user_id).one(&state.conn).await {
        Ok(Some(user)) => (StatusCode::OK, Json(Profile::from(user))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(rej) => return rej.into_response(),
    };

    let user = match User::find_by_id(user_id).one(&state.conn).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "User not found" })),
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
    };

    let mut active: user::ActiveModel = user.into();
    if let Some(full_name) = payload.full_name {
        active.full_name = Set(full_name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&state.conn).await {
        Ok(model) => (StatusCode::OK, Json(Profile::from(model))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
