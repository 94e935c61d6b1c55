//! Order item entity - One line item snapshot inside an order.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Catalog identifier as it appeared in the cart
    pub item_id: String,
    /// Item name at settlement time
    pub name: String,
    /// Units ordered
    pub quantity: i32,
    /// Price per unit at settlement time
    pub unit_price: f64,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
