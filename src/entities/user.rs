//! User entity - Represents a customer account.
//!
//! Accounts own exactly one cart (the `cart_items` rows keyed by their id) and any
//! number of orders. The `token` column is the opaque session credential that the
//! HTTP layer resolves from the `token` request header.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across accounts
    #[sea_orm(unique)]
    pub email: String,
    /// Opaque session token presented in the `token` header
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many cart entries
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// One user has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
