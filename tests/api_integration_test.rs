use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bookbazaar::auth::create_access_token;
use bookbazaar::db::{self, AppState};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_user(db: &DatabaseConnection, email: &str, role: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let user = bookbazaar::models::user::ActiveModel {
        email: Set(email.to_string()),
        full_name: Set("Test User".to_string()),
        phone: Set(None),
        password_hash: Set("$argon2id$dummy".to_string()),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = user.insert(db).await.expect("Failed to create user");
    res.id
}

async fn create_test_category(db: &DatabaseConnection, name: &str) -> i32 {
    let category = bookbazaar::models::category::ActiveModel {
        name: Set(name.to_string()),
        description: Set(Some("Test category".to_string())),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    let res = category.insert(db).await.expect("Failed to create category");
    res.id
}

async fn create_test_book(db: &DatabaseConnection, title: &str, category_id: i32) -> i32 {
    create_test_book_full(db, title, category_id, 9.99, 200, true).await
}

async fn create_test_book_full(
    db: &DatabaseConnection,
    title: &str,
    category_id: i32,
    price: f64,
    pages: i32,
    is_active: bool,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let book = bookbazaar::models::book::ActiveModel {
        title: Set(title.to_string()),
        author: Set("Test Author".to_string()),
        description: Set("Test description".to_string()),
        price: Set(price),
        cover_image: Set(String::new()),
        book_file: Set(None),
        category_id: Set(category_id),
        tags: Set(r#"["test"]"#.to_string()),
        pages: Set(pages),
        published_date: Set("2020-01-01".to_string()),
        isbn: Set(None),
        language: Set("en".to_string()),
        is_active: Set(is_active),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = book.insert(db).await.expect("Failed to create book");
    res.id
}

async fn create_test_review(db: &DatabaseConnection, book_id: i32, user_id: i32, rating: i32) {
    let review = bookbazaar::models::review::ActiveModel {
        book_id: Set(book_id),
        user_id: Set(user_id),
        rating: Set(rating),
        comment: Set(Some("nice".to_string())),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    review.insert(db).await.expect("Failed to create review");
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
async fn test_book_crud() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;

    // 1. Create
    let book_id = create_test_book(&db, "Test Book", category_id).await;

    // 2. Read
    let fetched = bookbazaar::models::book::Entity::find_by_id(book_id)
        .one(&db)
        .await
        .expect("Find failed");
    assert!(fetched.is_some());
    assert_eq!(fetched.unwrap().title, "Test Book");

    // 3. Update
    let mut active: bookbazaar::models::book::ActiveModel =
        bookbazaar::models::book::Entity::find_by_id(book_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap()
            .into();
    active.title = Set("Updated Title".to_string());
    active.update(&db).await.expect("Update failed");

    let updated = bookbazaar::models::book::Entity::find_by_id(book_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Updated Title");

    // 4. Delete
    bookbazaar::models::book::Entity::delete_by_id(book_id)
        .exec(&db)
        .await
        .expect("Delete failed");
    let deleted = bookbazaar::models::book::Entity::find_by_id(book_id)
        .one(&db)
        .await
        .unwrap();
    assert!(deleted.is_none());
}

#[tokio::test]
async fn test_list_books_excludes_inactive() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;

    create_test_book_full(&db, "Visible", category_id, 5.0, 100, true).await;
    create_test_book_full(&db, "Hidden", category_id, 5.0, 100, false).await;

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Visible");
}

#[tokio::test]
async fn test_book_detail_includes_derived_ratings() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    let book_id = create_test_book(&db, "Rated Book", category_id).await;

    let alice = create_test_user(&db, "alice@example.com", "user").await;
    let bob = create_test_user(&db, "bob@example.com", "user").await;
    create_test_review(&db, book_id, alice, 3).await;
    create_test_review(&db, book_id, bob, 4).await;

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}", book_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["review_count"], 2);
    assert_eq!(json["average_rating"], 3.5);
    assert_eq!(json["category_name"], "Fiction");
}

#[tokio::test]
async fn test_get_book_not_found() {
    let db = setup_test_db().await;

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_create_requires_admin() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let admin_id = create_test_user(&db, "admin@example.com", "admin").await;

    let payload = serde_json::json!({ "name": "Programming" });

    // Regular user is rejected
    let user_token = create_access_token(user_id, "user").unwrap();
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/categories")
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", user_token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin succeeds
    let admin_token = create_access_token(admin_id, "admin").unwrap();
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/categories")
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", admin_token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate name conflicts
    let admin_token = create_access_token(admin_id, "admin").unwrap();
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/categories")
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", admin_token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_review_rating_out_of_range_rejected() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    let book_id = create_test_book(&db, "Book", category_id).await;
    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let token = create_access_token(user_id, "user").unwrap();

    let payload = serde_json::json!({ "rating": 6, "comment": "too good" });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}/reviews", book_id))
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_review_conflicts() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    let book_id = create_test_book(&db, "Book", category_id).await;
    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let token = create_access_token(user_id, "user").unwrap();

    let payload = serde_json::json!({ "rating": 5 });

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}/reviews", book_id))
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}/reviews", book_id))
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reading_progress_get_or_create() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    let book_id = create_test_book_full(&db, "Book", category_id, 9.99, 200, true).await;
    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let token = create_access_token(user_id, "user").unwrap();

    // First read creates the row at page 1
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}/progress", book_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["current_page"], 1);
    assert_eq!(json["completed"], false);

    // Update moves the page and the percentage follows
    let payload = serde_json::json!({ "current_page": 50, "bookmarks": [10, 25] });
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}/progress", book_id))
                .method("PUT")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["current_page"], 50);
    assert_eq!(json["progress_percentage"], 25.0);
    assert_eq!(json["bookmarks"], serde_json::json!([10, 25]));
}

#[tokio::test]
async fn test_duplicate_progress_conflicts() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    let book_id = create_test_book(&db, "Book", category_id).await;
    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let token = create_access_token(user_id, "user").unwrap();

    let payload = serde_json::json!({ "book_id": book_id, "current_page": 5 });

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/progress")
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // One progress row per user per book
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/progress")
                .method("POST")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_progress_percentage_guards_zero_pages() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    let book_id = create_test_book_full(&db, "Pageless", category_id, 1.0, 0, true).await;
    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let token = create_access_token(user_id, "user").unwrap();

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri(format!("/books/{}/progress", book_id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["progress_percentage"], 0.0);
}

#[tokio::test]
async fn test_search_by_category_name() {
    let db = setup_test_db().await;
    let fiction = create_test_category(&db, "Fiction").await;
    let tech = create_test_category(&db, "Programming").await;
    create_test_book(&db, "Novel", fiction).await;
    create_test_book(&db, "Rust Book", tech).await;

    let user_id = create_test_user(&db, "user@example.com", "user").await;
    let token = create_access_token(user_id, "user").unwrap();

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/search?category=Programming")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Rust Book");

    // Unknown category name matches nothing
    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books/search?category=Nonexistent")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_seed_runs_twice_without_duplicates() {
    use sea_orm::PaginatorTrait;

    let db = setup_test_db().await;
    bookbazaar::seed::seed_demo_data(&db)
        .await
        .expect("first seed run");
    bookbazaar::seed::seed_demo_data(&db)
        .await
        .expect("second seed run");

    let users = bookbazaar::models::user::Entity::find()
        .count(&db)
        .await
        .unwrap();
    let categories = bookbazaar::models::category::Entity::find()
        .count(&db)
        .await
        .unwrap();
    let books = bookbazaar::models::book::Entity::find()
        .count(&db)
        .await
        .unwrap();
    let methods = bookbazaar::models::payment_method::Entity::find()
        .count(&db)
        .await
        .unwrap();

    assert_eq!(users, 2);
    assert_eq!(categories, 3);
    assert_eq!(books, 2);
    assert_eq!(methods, 1);
}

#[tokio::test]
async fn test_list_books_ordering_by_price() {
    let db = setup_test_db().await;
    let category_id = create_test_category(&db, "Fiction").await;
    create_test_book_full(&db, "Cheap", category_id, 1.0, 100, true).await;
    create_test_book_full(&db, "Pricey", category_id, 20.0, 100, true).await;

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books?ordering=price")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json[0]["title"], "Cheap");

    let response = app(&db)
        .oneshot(
            Request::builder()
                .uri("/books?ordering=-price")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json[0]["title"], "Pricey");
}
