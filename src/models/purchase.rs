use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    /// Book price at the time of purchase, never updated afterwards
    pub amount: f64,
    pub transaction_id: String,
    #[sea_orm(default_value = "pending")]
    pub status: String, // 'pending', 'approved', 'rejected'
    // Buyer contact details snapshotted at purchase time
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub created_at: String,
    pub approved_at: Option<String>,
    pub approved_by: Option<i32>,
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
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ApprovedBy",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Approver,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Purchase enriched with a book summary for list/detail responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseDto {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub book: Option<super::book::BookDto>,
    pub amount: f64,
    pub transaction_id: String,
    pub status: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub created_at: String,
    pub approved_at: Option<String>,
    pub approved_by: Option<i32>,
}
