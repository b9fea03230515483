//! Reading progress: one row per user per book, with a percentage
//! derived from the book's page count on every read.

use sea_orm::*;
use std::collections::HashMap;

use super::ServiceError;
use crate::models::book::{self, Entity as Book};
use crate::models::reading_progress::{self, Entity as ReadingProgress, ProgressDto};

/// Input for creating or updating a progress row
#[derive(Debug, Default, serde::Deserialize)]
pub struct ProgressUpdate {
    pub current_page: Option<i32>,
    pub bookmarks: Option<Vec<i32>>,
    pub completed: Option<bool>,
}

fn percentage(current_page: i32, pages: i32) -> f64 {
    if pages > 0 {
        (current_page as f64 / pages as f64) * 100.0
    } else {
        0.0
    }
}

fn to_dto(model: reading_progress::Model, book: Option<&book::Model>) -> ProgressDto {
    let bookmarks: Vec<i32> = serde_json::from_str(&model.bookmarks).unwrap_or_default();
    let pages = book.map(|b| b.pages).unwrap_or(0);

    ProgressDto {
        id: model.id,
        book_id: model.book_id,
        book_title: book.map(|b| b.title.clone()),
        current_page: model.current_page,
        total_pages: pages,
        bookmarks,
        completed: model.completed,
        progress_percentage: percentage(model.current_page, pages),
        last_read: model.last_read,
    }
}

/// All progress rows for one user, newest read first
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<ProgressDto>, ServiceError> {
    let rows = ReadingProgress::find()
        .filter(reading_progress::Column::UserId.eq(user_id))
        .order_by_desc(reading_progress::Column::LastRead)
        .all(db)
        .await?;

    let book_ids: Vec<i32> = rows.iter().map(|r| r.book_id).collect();
    let mut books: HashMap<i32, book::Model> = HashMap::new();
    if !book_ids.is_empty() {
        for b in Book::find()
            .filter(book::Column::Id.is_in(book_ids))
            .all(db)
            .await?
        {
            books.insert(b.id, b);
        }
    }

    Ok(rows
        .into_iter()
        .map(|r| {
            let book = books.get(&r.book_id);
            to_dto(r, book)
        })
        .collect())
}

/// Start tracking a book explicitly. Duplicate rows surface as Conflict.
pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    payload: ProgressUpdate,
) -> Result<ProgressDto, ServiceError> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let row = reading_progress::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        current_page: Set(payload.current_page.unwrap_or(1)),
        bookmarks: Set(serde_json::to_string(&payload.bookmarks.unwrap_or_default())
            .unwrap_or_else(|_| "[]".to_owned())),
        completed: Set(payload.completed.unwrap_or(false)),
        last_read: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let model = row.insert(db).await?;
    Ok(to_dto(model, Some(&book)))
}

/// Fetch the caller's progress for a book, creating a fresh row at
/// page 1 if none exists yet.
pub async fn get_or_create(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
) -> Result<ProgressDto, ServiceError> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let existing = ReadingProgress::find()
        .filter(reading_progress::Column::UserId.eq(user_id))
        .filter(reading_progress::Column::BookId.eq(book_id))
        .one(db)
        .await?;

    if let Some(model) = existing {
        return Ok(to_dto(model, Some(&book)));
    }

    let row = reading_progress::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        current_page: Set(1),
        bookmarks: Set("[]".to_owned()),
        completed: Set(false),
        last_read: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let model = row.insert(db).await?;
    Ok(to_dto(model, Some(&book)))
}

/// Update the caller's progress for a book; creates the row first if
/// the reader never opened the book through the API.
pub async fn update(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    payload: ProgressUpdate,
) -> Result<ProgressDto, ServiceError> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    // get_or_create semantics, same as the detail read
    let current = get_or_create(db, user_id, book_id).await?;

    let model = ReadingProgress::find_by_id(current.id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: reading_progress::ActiveModel = model.into();

    if let Some(current_page) = payload.current_page {
        if current_page < 1 {
            return Err(ServiceError::InvalidState(
                "current_page must be at least 1".to_owned(),
            ));
        }
        active.current_page = Set(current_page);
    }
    if let Some(bookmarks) = payload.bookmarks {
        active.bookmarks =
            Set(serde_json::to_string(&bookmarks).unwrap_or_else(|_| "[]".to_owned()));
    }
    if let Some(completed) = payload.completed {
        active.completed = Set(completed);
    }
    active.last_read = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(db).await?;
    Ok(to_dto(updated, Some(&book)))
}
