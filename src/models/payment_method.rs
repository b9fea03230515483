use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub qr_code: Option<String>,
    pub account_details: String, // JSON object
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentMethodDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub qr_code: Option<String>,
    pub account_details: serde_json::Value,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Model> for PaymentMethodDto {
    fn from(model: Model) -> Self {
        let account_details = serde_json::from_str(&model.account_details)
            .unwrap_or_else(|_| serde_json::json!({}));

        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            qr_code: model.qr_code,
            account_details,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}
