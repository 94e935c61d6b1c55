//! Order entity - A settled order with its delivery address.
//!
//! Orders are written once at settlement and never modified. The address is stored
//! as flat columns so it stays queryable.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who placed the order
    pub user_id: i64,
    /// Total amount, the sum of unit price times quantity over the line items
    pub amount: f64,
    /// Recipient first name
    pub first_name: String,
    /// Recipient last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Street address
    pub street: String,
    /// Apartment, suite, unit
    pub apartment: Option<String>,
    /// City
    pub city: String,
    /// State or province
    pub state: Option<String>,
    /// ZIP or postal code
    pub zipcode: String,
    /// Country
    pub country: String,
    /// Free-form instructions for the courier
    pub delivery_notes: Option<String>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
