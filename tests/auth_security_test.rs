use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bookbazaar::auth::{
    create_access_token, create_refresh_token, decode_token, hash_password, verify_password,
};
use bookbazaar::db::{self, AppState};
use sea_orm::DatabaseConnection;
use tower::util::ServiceExt; // for `oneshot`

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn app(db: &DatabaseConnection) -> axum::Router {
    bookbazaar::api::api_router(AppState::new(db.clone()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_token_roundtrip() {
    let token = create_access_token(42, "user").expect("Failed to create token");
    let claims = decode_token(&token).expect("Failed to decode token");

    assert_eq!(claims.sub, "42");
    assert_eq!(claims.role, "user");
    assert_eq!(claims.token_type, "access");
    assert_eq!(claims.user_id().unwrap(), 42);
}

#[tokio::test]
async fn test_register_and_login_flow() {
    let db = setup_test_db().await;

    let payload = serde_json::json!({
        "full_name": "New Reader",
        "email": "new@example.com",
        "password": "long_enough_password"
    });

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "new@example.com");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["access"].is_string());
    assert!(json["refresh"].is_string());
    // Password hash never leaves the server
    assert!(json["user"].get("password_hash").is_none());

    // Duplicate email is rejected
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Login with the registered credentials
    let login = serde_json::json!({
        "email": "new@example.com",
        "password": "long_enough_password"
    });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&login).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let access = json["access"].as_str().unwrap().to_string();

    // Wrong password is 401
    let bad_login = serde_json::json!({
        "email": "new@example.com",
        "password": "wrong"
    });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&bad_login).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The access token works against the profile endpoint
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/profile")
                .header("Authorization", format!("Bearer {}", access))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["full_name"], "New Reader");
}

#[tokio::test]
async fn test_short_password_rejected() {
    let db = setup_test_db().await;

    let payload = serde_json::json!({
        "full_name": "X",
        "email": "short@example.com",
        "password": "short"
    });

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_token_exchange() {
    let refresh = create_refresh_token(7, "user").unwrap();
    let db = setup_test_db().await;

    let payload = serde_json::json!({ "refresh": refresh });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/token/refresh")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let access = json["access"].as_str().unwrap();
    let claims = decode_token(access).unwrap();
    assert_eq!(claims.token_type, "access");
    assert_eq!(claims.sub, "7");

    // An access token is not accepted as a refresh token
    let access_token = create_access_token(7, "user").unwrap();
    let payload = serde_json::json!({ "refresh": access_token });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/token/refresh")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_rejected_as_bearer() {
    let db = setup_test_db().await;
    let refresh = create_refresh_token(7, "admin").unwrap();

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/profile")
                .header("Authorization", format!("Bearer {}", refresh))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_auth_header() {
    let db = setup_test_db().await;

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/profile")
                .header("Authorization", "Token not-a-bearer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_write_rejected_for_user_token() {
    let db = setup_test_db().await;
    let token = create_access_token(1, "user").unwrap();

    let payload = serde_json::json!({
        "title": "T",
        "author": "A",
        "description": "D",
        "price": 1.0,
        "category_id": 1,
        "pages": 10,
        "published_date": "2020-01-01"
    });

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books")
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_returns_ok() {
    let db = setup_test_db().await;
    let refresh = create_refresh_token(1, "user").unwrap();

    let payload = serde_json::json!({ "refresh": refresh });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/auth/logout")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
