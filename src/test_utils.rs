//! Shared test utilities for medicart.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{cart::NewCartItem, catalog, catalog::NewMedicine, order::DeliveryAddress, user},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user named "Test User" with email `test@example.com`.
pub async fn create_test_user(db: &DatabaseConnection) -> Result<entities::user::Model> {
    user::create_user(db, "Test User", "test@example.com").await
}

/// Creates a test user with custom name and email.
pub async fn create_custom_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, name, email).await
}

/// Sets up a complete test environment with one user.
/// Returns (db, user) for cart and order tests.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db).await?;
    Ok((db, user))
}

/// Medicine input with every required field filled in.
///
/// # Defaults
/// * `category`: "general"
/// * `manufacturer`: "Acme Pharma"
/// * `dosage`: "1 tablet twice daily"
/// * `image_url`: None
pub fn sample_medicine(name: &str, price: f64) -> NewMedicine {
    NewMedicine {
        name: name.to_string(),
        category: "general".to_string(),
        manufacturer: "Acme Pharma".to_string(),
        description: format!("{name} description"),
        price,
        dosage: "1 tablet twice daily".to_string(),
        image_url: None,
    }
}

/// Creates a test medicine priced at 10.0.
pub async fn create_test_medicine(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::medicine::Model> {
    catalog::create_medicine(db, sample_medicine(name, 10.0)).await
}

/// Cart input for `item_id`, named `"Item <item_id>"`.
pub fn cart_item_input(item_id: &str, price: f64) -> NewCartItem {
    NewCartItem {
        item_id: item_id.to_string(),
        name: format!("Item {item_id}"),
        image_url: format!("http://localhost:4000/images/{item_id}.png"),
        price,
    }
}

/// A complete delivery address.
pub fn sample_address() -> DeliveryAddress {
    DeliveryAddress {
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91 98765 43210".to_string(),
        street: "12 MG Road".to_string(),
        apartment: Some("4B".to_string()),
        city: "Bengaluru".to_string(),
        state: Some("KA".to_string()),
        zipcode: "560001".to_string(),
        country: "India".to_string(),
        delivery_notes: None,
    }
}
