//! Book catalog queries: filtered listing, search, and the derived
//! rating fields computed from reviews on every read.

use sea_orm::*;
use std::collections::HashMap;

use super::ServiceError;
use crate::models::book::{self, BookDto, CreateBook, Entity as Book, UpdateBook};
use crate::models::category::{self, Entity as Category};
use crate::models::purchase::{self, Entity as Purchase, STATUS_APPROVED};
use crate::models::review::{self, Entity as Review};

/// Filter parameters for the catalog listing
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub category: Option<i32>,
    pub language: Option<String>,
    pub q: Option<String>,
    pub ordering: Option<String>,
}

/// Convert book rows into DTOs, filling category_name, average_rating
/// and review_count from the related tables.
pub async fn to_dtos(
    db: &DatabaseConnection,
    books: Vec<book::Model>,
) -> Result<Vec<BookDto>, ServiceError> {
    let category_ids: Vec<i32> = books.iter().map(|b| b.category_id).collect();
    let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();

    let mut category_names: HashMap<i32, String> = HashMap::new();
    if !category_ids.is_empty() {
        let categories = Category::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await?;
        for cat in categories {
            category_names.insert(cat.id, cat.name);
        }
    }

    // (count, rating sum) per book
    let mut rating_totals: HashMap<i32, (i64, i64)> = HashMap::new();
    if !book_ids.is_empty() {
        let reviews = Review::find()
            .filter(review::Column::BookId.is_in(book_ids))
            .all(db)
            .await?;
        for r in reviews {
            let entry = rating_totals.entry(r.book_id).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += r.rating as i64;
        }
    }

    let result = books
        .into_iter()
        .map(|model| {
            let category_name = category_names.get(&model.category_id).cloned();
            let (count, sum) = rating_totals.get(&model.id).copied().unwrap_or((0, 0));

            let mut dto = BookDto::from(model);
            dto.category_name = category_name;
            dto.review_count = count;
            dto.average_rating = if count > 0 {
                sum as f64 / count as f64
            } else {
                0.0
            };
            dto
        })
        .collect();

    Ok(result)
}

fn apply_ordering(query: Select<Book>, ordering: Option<&str>) -> Select<Book> {
    match ordering {
        Some("created_at") => query.order_by_asc(book::Column::CreatedAt),
        Some("price") => query.order_by_asc(book::Column::Price),
        Some("-price") => query.order_by_desc(book::Column::Price),
        Some("title") => query.order_by_asc(book::Column::Title),
        Some("-title") => query.order_by_desc(book::Column::Title),
        // '-created_at' and anything unrecognized: newest first
        _ => query.order_by_desc(book::Column::CreatedAt),
    }
}

/// List active books with optional filters and free-text search
pub async fn list_books(
    db: &DatabaseConnection,
    filter: BookFilter,
) -> Result<Vec<BookDto>, ServiceError> {
    let mut condition = Condition::all().add(book::Column::IsActive.eq(true));

    if let Some(category_id) = filter.category {
        condition = condition.add(book::Column::CategoryId.eq(category_id));
    }

    if let Some(language) = filter.language {
        condition = condition.add(book::Column::Language.eq(language));
    }

    if let Some(q) = filter.q.filter(|q| !q.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(book::Column::Title.contains(&q))
                .add(book::Column::Author.contains(&q))
                .add(book::Column::Description.contains(&q))
                .add(book::Column::Tags.contains(&q)),
        );
    }

    let query = Book::find().filter(condition);
    let books = apply_ordering(query, filter.ordering.as_deref())
        .all(db)
        .await?;

    to_dtos(db, books).await
}

/// Free-text search over active books, optionally narrowed to a
/// category by name.
pub async fn search_books(
    db: &DatabaseConnection,
    q: Option<String>,
    category_name: Option<String>,
) -> Result<Vec<BookDto>, ServiceError> {
    let mut condition = Condition::all().add(book::Column::IsActive.eq(true));

    if let Some(q) = q.filter(|q| !q.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(book::Column::Title.contains(&q))
                .add(book::Column::Author.contains(&q))
                .add(book::Column::Description.contains(&q)),
        );
    }

    if let Some(name) = category_name.filter(|n| !n.is_empty()) {
        let category = Category::find()
            .filter(category::Column::Name.eq(&name))
            .one(db)
            .await?;
        match category {
            Some(cat) => condition = condition.add(book::Column::CategoryId.eq(cat.id)),
            // Unknown category name matches nothing
            None => return Ok(Vec::new()),
        }
    }

    let books = Book::find()
        .filter(condition)
        .order_by_desc(book::Column::CreatedAt)
        .all(db)
        .await?;

    to_dtos(db, books).await
}

/// Fetch a single active book or NotFound
pub async fn get_book(db: &DatabaseConnection, id: i32) -> Result<BookDto, ServiceError> {
    let book = Book::find_by_id(id)
        .filter(book::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut dtos = to_dtos(db, vec![book]).await?;
    Ok(dtos.remove(0))
}

pub async fn create_book(
    db: &DatabaseConnection,
    payload: CreateBook,
) -> Result<book::Model, ServiceError> {
    let now = chrono::Utc::now().to_rfc3339();

    // The category must exist; SQLite would reject the FK anyway but a
    // clean NotFound beats a constraint error message
    Category::find_by_id(payload.category_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut new_book: book::ActiveModel = payload.into();
    new_book.created_at = Set(now.clone());
    new_book.updated_at = Set(now);

    let model = new_book.insert(db).await?;
    Ok(model)
}

pub async fn update_book(
    db: &DatabaseConnection,
    id: i32,
    payload: UpdateBook,
) -> Result<book::Model, ServiceError> {
    let book = Book::find_by_id(id)
        .filter(book::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: book::ActiveModel = book.into();

    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(author) = payload.author {
        active.author = Set(author);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(cover_image) = payload.cover_image {
        active.cover_image = Set(cover_image);
    }
    if let Some(book_file) = payload.book_file {
        active.book_file = Set(book_file);
    }
    if let Some(category_id) = payload.category_id {
        Category::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound)?;
        active.category_id = Set(category_id);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_owned()));
    }
    if let Some(pages) = payload.pages {
        active.pages = Set(pages);
    }
    if let Some(published_date) = payload.published_date {
        active.published_date = Set(published_date);
    }
    if let Some(isbn) = payload.isbn {
        active.isbn = Set(isbn);
    }
    if let Some(language) = payload.language {
        active.language = Set(language);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let model = active.update(db).await?;
    Ok(model)
}

pub async fn delete_book(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    // Same visibility rule as reads: inactive books are not deletable
    Book::find_by_id(id)
        .filter(book::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Book::delete_by_id(id).exec(db).await?;
    Ok(())
}

/// Books the user has an approved purchase for
pub async fn purchased_books(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<BookDto>, ServiceError> {
    let purchases_with_books = Purchase::find()
        .filter(purchase::Column::UserId.eq(user_id))
        .filter(purchase::Column::Status.eq(STATUS_APPROVED))
        .find_also_related(Book)
        .all(db)
        .await?;

    let books: Vec<book::Model> = purchases_with_books
        .into_iter()
        .filter_map(|(_, book)| book)
        .collect();

    to_dtos(db, books).await
}
