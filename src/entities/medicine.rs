//! Medicine entity - A purchasable catalog record.
//!
//! Medicines are written only by administrators and read by the storefront. Cart
//! entries copy the name, price and image of a medicine when it is added, so later
//! catalog changes do not reach existing carts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Medicine database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medicines")]
pub struct Model {
    /// Unique identifier for the medicine
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name (e.g., "Paracetamol 500mg")
    pub name: String,
    /// Catalog category (e.g., "pain relief")
    pub category: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Free-form description
    pub description: String,
    /// Unit price, never negative
    pub price: f64,
    /// Dosage instructions
    pub dosage: String,
    /// Public URL of the product image, if one was uploaded
    pub image_url: Option<String>,
    /// When the medicine was created
    pub created_at: DateTimeUtc,
    /// When the medicine was last modified
    pub updated_at: DateTimeUtc,
}

/// Medicines are referenced by cart and order rows only through copied ids
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
