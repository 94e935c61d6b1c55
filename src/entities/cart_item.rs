//! Cart item entity - One line of a user's cart.
//!
//! The composite primary key `(user_id, item_id)` guarantees at most one entry per
//! item in a cart. `item_id` is an opaque copy of the catalog identifier and the
//! name, image and price are snapshots taken when the item was first added.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Owning user
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Catalog identifier copied from the client
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: String,
    /// Item name at the time it was added
    pub name: String,
    /// Image URL at the time it was added
    pub image_url: String,
    /// Unit price at the time it was added
    pub price: f64,
    /// Number of units, always at least 1
    pub quantity: i32,
    /// When the entry was first added, never updated
    pub added_at: DateTimeUtc,
    /// Per-user insertion sequence, carts are listed in this order
    pub position: i64,
}

/// Defines relationships between `CartItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart entry belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
