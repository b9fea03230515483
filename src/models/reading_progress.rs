use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reading_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub current_page: i32,
    pub bookmarks: String, // JSON array of page numbers
    pub completed: bool,
    pub last_read: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Progress row enriched with book info. The percentage is recomputed
/// on every read from the book's page count.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressDto {
    pub id: i32,
    pub book_id: i32,
    pub book_title: Option<String>,
    pub current_page: i32,
    pub total_pages: i32,
    pub bookmarks: Vec<i32>,
    pub completed: bool,
    pub progress_percentage: f64,
    pub last_read: String,
}
