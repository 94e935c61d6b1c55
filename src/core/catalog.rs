//! Catalog business logic - Handles medicine records.
//!
//! The storefront only reads the catalog; creation and deletion are administrative
//! operations. There is no update: a changed medicine is removed and re-added. Cart
//! entries keep their own copy of name and price, so nothing here touches carts.

use crate::{
    entities::{Medicine, medicine},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Fields required to create a medicine.
#[derive(Debug, Clone)]
pub struct NewMedicine {
    /// Product name
    pub name: String,
    /// Catalog category
    pub category: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Free-form description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Dosage instructions
    pub dosage: String,
    /// Public URL of an already stored image
    pub image_url: Option<String>,
}

impl NewMedicine {
    fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("category", &self.category),
            ("manufacturer", &self.manufacturer),
            ("description", &self.description),
            ("dosage", &self.dosage),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::invalid_argument(format!(
                "Please provide all required fields ({field} is missing)"
            )));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidAmount { amount: self.price });
        }

        Ok(())
    }
}

/// Retrieves every medicine, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_medicines(db: &DatabaseConnection) -> Result<Vec<medicine::Model>> {
    Medicine::find()
        .order_by_desc(medicine::Column::CreatedAt)
        .order_by_desc(medicine::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific medicine by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_medicine(
    db: &DatabaseConnection,
    medicine_id: i64,
) -> Result<Option<medicine::Model>> {
    Medicine::find_by_id(medicine_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new medicine after validating every required field.
///
/// Text fields are trimmed before they are stored.
///
/// # Errors
/// Returns an error if:
/// - Any of name, category, manufacturer, description or dosage is empty
/// - The price is negative or not finite (NaN, infinity)
/// - The database insert operation fails
pub async fn create_medicine(
    db: &DatabaseConnection,
    new_medicine: NewMedicine,
) -> Result<medicine::Model> {
    new_medicine.validate()?;

    let now = chrono::Utc::now();
    let medicine = medicine::ActiveModel {
        name: Set(new_medicine.name.trim().to_string()),
        category: Set(new_medicine.category.trim().to_string()),
        manufacturer: Set(new_medicine.manufacturer.trim().to_string()),
        description: Set(new_medicine.description.trim().to_string()),
        price: Set(new_medicine.price),
        dosage: Set(new_medicine.dosage.trim().to_string()),
        image_url: Set(new_medicine.image_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let medicine = medicine.insert(db).await?;
    info!("Added medicine {} ({})", medicine.id, medicine.name);
    Ok(medicine)
}

/// Deletes a medicine and returns the removed record.
///
/// The caller is responsible for releasing the image the record pointed to.
///
/// # Errors
/// Returns an error if:
/// - The medicine does not exist
/// - The database delete operation fails
pub async fn remove_medicine(db: &DatabaseConnection, medicine_id: i64) -> Result<medicine::Model> {
    let medicine = Medicine::find_by_id(medicine_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::MedicineNotFound {
            id: medicine_id.to_string(),
        })?;

    Medicine::delete_by_id(medicine_id).exec(db).await?;
    info!("Removed medicine {} ({})", medicine.id, medicine.name);
    Ok(medicine)
}
