//! Purchase workflow: buyers submit a purchase with their payment
//! reference, an admin later approves or rejects it. No gateway is
//! involved; the status flip is the whole workflow.

use sea_orm::*;

use super::{book_service, ServiceError};
use crate::models::book::Entity as Book;
use crate::models::purchase::{
    self, Entity as Purchase, PurchaseDto, STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED,
};

/// Input for creating a purchase. Contact details are snapshotted onto
/// the purchase row so later profile edits don't rewrite history.
#[derive(Debug, serde::Deserialize)]
pub struct CreatePurchase {
    pub book_id: i32,
    #[serde(default)]
    pub transaction_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
}

/// Statistics over all purchases (admin dashboard)
#[derive(Debug, serde::Serialize)]
pub struct PurchaseStats {
    pub total_purchases: u64,
    pub approved_purchases: u64,
    pub pending_purchases: u64,
    pub rejected_purchases: u64,
    pub total_revenue: f64,
}

async fn to_dtos(
    db: &DatabaseConnection,
    rows: Vec<(purchase::Model, Option<crate::models::book::Model>)>,
) -> Result<Vec<PurchaseDto>, ServiceError> {
    let books: Vec<crate::models::book::Model> =
        rows.iter().filter_map(|(_, b)| b.clone()).collect();
    let book_dtos = book_service::to_dtos(db, books).await?;

    let result = rows
        .into_iter()
        .map(|(p, book)| {
            let book_dto = book.and_then(|b| {
                book_dtos
                    .iter()
                    .find(|dto| dto.id == Some(b.id))
                    .cloned()
            });
            PurchaseDto {
                id: p.id,
                user_id: p.user_id,
                book_id: p.book_id,
                book: book_dto,
                amount: p.amount,
                transaction_id: p.transaction_id,
                status: p.status,
                user_name: p.user_name,
                user_email: p.user_email,
                user_phone: p.user_phone,
                created_at: p.created_at,
                approved_at: p.approved_at,
                approved_by: p.approved_by,
            }
        })
        .collect();

    Ok(result)
}

/// List purchases: admins see everything, users only their own
pub async fn list_purchases(
    db: &DatabaseConnection,
    user_id: i32,
    is_admin: bool,
) -> Result<Vec<PurchaseDto>, ServiceError> {
    let mut query = Purchase::find().order_by_desc(purchase::Column::CreatedAt);

    if !is_admin {
        query = query.filter(purchase::Column::UserId.eq(user_id));
    }

    let rows = query.find_also_related(Book).all(db).await?;
    to_dtos(db, rows).await
}

/// Fetch one purchase, honoring the same visibility rule as the list
pub async fn get_purchase(
    db: &DatabaseConnection,
    id: i32,
    user_id: i32,
    is_admin: bool,
) -> Result<PurchaseDto, ServiceError> {
    let mut query = Purchase::find_by_id(id);

    if !is_admin {
        query = query.filter(purchase::Column::UserId.eq(user_id));
    }

    let row = query
        .find_also_related(Book)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut dtos = to_dtos(db, vec![row]).await?;
    Ok(dtos.remove(0))
}

/// Create a pending purchase, snapshotting the book's current price
pub async fn create_purchase(
    db: &DatabaseConnection,
    user_id: i32,
    payload: CreatePurchase,
) -> Result<purchase::Model, ServiceError> {
    let book = Book::find_by_id(payload.book_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let transaction_id = if payload.transaction_id.trim().is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        payload.transaction_id
    };

    let new_purchase = purchase::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book.id),
        amount: Set(book.price),
        transaction_id: Set(transaction_id),
        status: Set(STATUS_PENDING.to_owned()),
        user_name: Set(payload.user_name),
        user_email: Set(payload.user_email),
        user_phone: Set(payload.user_phone),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let model = new_purchase.insert(db).await?;
    Ok(model)
}

/// Approve a purchase, stamping when and by whom. The flip is
/// unconditional: re-approving just refreshes the stamp.
pub async fn approve_purchase(
    db: &DatabaseConnection,
    id: i32,
    approver_id: i32,
) -> Result<purchase::Model, ServiceError> {
    let purchase = Purchase::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: purchase::ActiveModel = purchase.into();
    active.status = Set(STATUS_APPROVED.to_owned());
    active.approved_at = Set(Some(chrono::Utc::now().to_rfc3339()));
    active.approved_by = Set(Some(approver_id));

    let model = active.update(db).await?;
    Ok(model)
}

pub async fn reject_purchase(
    db: &DatabaseConnection,
    id: i32,
) -> Result<purchase::Model, ServiceError> {
    let purchase = Purchase::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let mut active: purchase::ActiveModel = purchase.into();
    active.status = Set(STATUS_REJECTED.to_owned());

    let model = active.update(db).await?;
    Ok(model)
}

/// Counts per status plus revenue over approved purchases
pub async fn statistics(db: &DatabaseConnection) -> Result<PurchaseStats, ServiceError> {
    let total_purchases = Purchase::find().count(db).await?;
    let approved_purchases = Purchase::find()
        .filter(purchase::Column::Status.eq(STATUS_APPROVED))
        .count(db)
        .await?;
    let pending_purchases = Purchase::find()
        .filter(purchase::Column::Status.eq(STATUS_PENDING))
        .count(db)
        .await?;
    let rejected_purchases = Purchase::find()
        .filter(purchase::Column::Status.eq(STATUS_REJECTED))
        .count(db)
        .await?;

    let approved = Purchase::find()
        .filter(purchase::Column::Status.eq(STATUS_APPROVED))
        .all(db)
        .await?;
    let total_revenue: f64 = approved.iter().map(|p| p.amount).sum();

    Ok(PurchaseStats {
        total_purchases,
        approved_purchases,
        pending_purchases,
        rejected_purchases,
        total_revenue,
    })
}
