use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub cover_image: String,
    pub book_file: Option<String>,
    pub category_id: i32,
    pub tags: String, // JSON array
    pub pages: i32,
    pub published_date: String,
    pub isbn: Option<String>,
    #[sea_orm(default_value = "en")]
    pub language: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// DTO for API responses. The rating fields are derived from reviews
/// on every read and are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDto {
    pub id: Option<i32>,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub cover_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_file: Option<String>,
    pub category_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub tags: Vec<String>,
    pub pages: i32,
    pub published_date: String,
    pub isbn: Option<String>,
    pub language: String,
    pub is_active: bool,
    pub average_rating: f64,
    pub review_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Model> for BookDto {
    fn from(model: Model) -> Self {
        let tags: Vec<String> = serde_json::from_str(&model.tags).unwrap_or_default();

        Self {
            id: Some(model.id),
            title: model.title,
            author: model.author,
            description: model.description,
            price: model.price,
            cover_image: model.cover_image,
            book_file: model.book_file,
            category_id: model.category_id,
            category_name: None, // filled from the relation by the service
            tags,
            pages: model.pages,
            published_date: model.published_date,
            isbn: model.isbn,
            language: model.language,
            is_active: model.is_active,
            average_rating: 0.0,
            review_count: 0,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
        }
    }
}

/// Request body for creating a book (admin only)
#[derive(Debug, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub cover_image: String,
    pub book_file: Option<String>,
    pub category_id: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub pages: i32,
    pub published_date: String,
    pub isbn: Option<String>,
    pub language: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CreateBook> for ActiveModel {
    fn from(book: CreateBook) -> Self {
        Self {
            id: NotSet,
            title: Set(book.title),
            author: Set(book.author),
            description: Set(book.description),
            price: Set(book.price),
            cover_image: Set(book.cover_image),
            book_file: Set(book.book_file),
            category_id: Set(book.category_id),
            tags: Set(serde_json::to_string(&book.tags).unwrap_or_else(|_| "[]".to_owned())),
            pages: Set(book.pages),
            published_date: Set(book.published_date),
            isbn: Set(book.isbn),
            language: Set(book.language.unwrap_or_else(|| "en".to_owned())),
            is_active: Set(book.is_active.unwrap_or(true)),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}

/// Request body for updating a book. Every field is optional so the
/// admin frontend can send partial edits.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub cover_image: Option<String>,
    pub book_file: Option<Option<String>>,
    pub category_id: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub pages: Option<i32>,
    pub published_date: Option<String>,
    pub isbn: Option<Option<String>>,
    pub language: Option<String>,
    pub is_active: Option<bool>,
}
