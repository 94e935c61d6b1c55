//! Order business logic - Settles carts into orders and lists order history.
//!
//! Settlement recomputes the order total from the submitted line items and refuses
//! an order whose declared amount disagrees with it. The order row, its line items
//! and (by default) the clearing of the user's cart are written in one storage
//! transaction, so a failure part way leaves neither a half-written order nor a cart
//! that still holds already-ordered items.

use std::collections::HashMap;

use crate::{
    config::app::OrderConfig,
    core::{cart::delete_cart_entries, user::require_user},
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One line of an order as submitted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Catalog identifier, as stored in the cart
    pub item_id: String,
    /// Item name
    pub name: String,
    /// Units ordered
    pub quantity: i32,
    /// Price per unit
    pub unit_price: f64,
}

/// Delivery address and contact details for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
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
    /// Instructions for the courier
    pub delivery_notes: Option<String>,
}

impl DeliveryAddress {
    fn validate(&self) -> Result<()> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("zipcode", &self.zipcode),
            ("country", &self.country),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "Address is missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    fn from_order(order: &order::Model) -> Self {
        Self {
            first_name: order.first_name.clone(),
            last_name: order.last_name.clone(),
            email: order.email.clone(),
            phone: order.phone.clone(),
            street: order.street.clone(),
            apartment: order.apartment.clone(),
            city: order.city.clone(),
            state: order.state.clone(),
            zipcode: order.zipcode.clone(),
            country: order.country.clone(),
            delivery_notes: order.delivery_notes.clone(),
        }
    }
}

/// Everything the caller submits to place an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Line items, usually a copy of the cart
    pub items: Vec<LineItem>,
    /// Where to deliver
    pub address: DeliveryAddress,
    /// Total the caller computed, checked against the line items
    pub declared_amount: Option<f64>,
}

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// The order row
    pub order: order::Model,
    /// Its line items in submission order
    pub items: Vec<order_item::Model>,
}

impl PlacedOrder {
    /// Reassembles the delivery address stored on the order.
    #[must_use]
    pub fn address(&self) -> DeliveryAddress {
        DeliveryAddress::from_order(&self.order)
    }
}

/// Sums `unit_price * quantity` over the line items, rounded to cents.
#[must_use]
pub fn compute_total(items: &[LineItem]) -> f64 {
    let total: f64 = items
        .iter()
        .map(|item| item.unit_price * f64::from(item.quantity))
        .sum();
    (total * 100.0).round() / 100.0
}

fn validate_items(items: &[LineItem]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::invalid_argument("Order must contain at least one item"));
    }

    for item in items {
        if item.item_id.trim().is_empty() || item.name.trim().is_empty() {
            return Err(Error::invalid_argument(
                "Every order item needs an id and a name",
            ));
        }
        if item.quantity < 1 {
            return Err(Error::invalid_argument(format!(
                "Quantity of {} must be at least 1",
                item.item_id
            )));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(Error::InvalidAmount {
                amount: item.unit_price,
            });
        }
    }

    Ok(())
}

/// Places an order for a user.
///
/// The declared amount must be within `settings.amount_tolerance` of the recomputed
/// total; the recomputed total is what gets stored. When
/// `settings.clear_cart_on_settle` is set, the user's cart is emptied in the same
/// transaction.
///
/// # Errors
/// Returns an error if:
/// - The order has no items, or an item is malformed
/// - The declared amount is missing, not a finite number, or disagrees with the items
/// - A required address field is empty
/// - The user does not exist
/// - A database operation fails
pub async fn place_order(
    db: &DatabaseConnection,
    user_id: i64,
    new_order: NewOrder,
    settings: &OrderConfig,
) -> Result<PlacedOrder> {
    let Some(declared) = new_order.declared_amount else {
        return Err(Error::invalid_argument("Order amount is required"));
    };
    if !declared.is_finite() || declared < 0.0 {
        return Err(Error::InvalidAmount { amount: declared });
    }

    validate_items(&new_order.items)?;
    new_order.address.validate()?;

    let computed = compute_total(&new_order.items);
    if (declared - computed).abs() > settings.amount_tolerance {
        return Err(Error::AmountMismatch { declared, computed });
    }

    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let address = new_order.address;
    let order = order::ActiveModel {
        user_id: Set(user_id),
        amount: Set(computed),
        first_name: Set(address.first_name.trim().to_string()),
        last_name: Set(address.last_name.trim().to_string()),
        email: Set(address.email.trim().to_string()),
        phone: Set(address.phone.trim().to_string()),
        street: Set(address.street.trim().to_string()),
        apartment: Set(non_blank(address.apartment)),
        city: Set(address.city.trim().to_string()),
        state: Set(non_blank(address.state)),
        zipcode: Set(address.zipcode.trim().to_string()),
        country: Set(address.country.trim().to_string()),
        delivery_notes: Set(non_blank(address.delivery_notes)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(new_order.items.len());
    for item in new_order.items {
        let line = order_item::ActiveModel {
            order_id: Set(order.id),
            item_id: Set(item.item_id.trim().to_string()),
            name: Set(item.name.trim().to_string()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(line);
    }

    let cleared = if settings.clear_cart_on_settle {
        delete_cart_entries(&txn, user_id).await?
    } else {
        0
    };

    txn.commit().await?;

    info!(
        "User {} placed order {} for {:.2} ({} items, {} cart entries cleared)",
        user_id,
        order.id,
        order.amount,
        items.len(),
        cleared
    );
    Ok(PlacedOrder { order, items })
}

/// Lists a user's orders, most recent first. A user without orders gets an empty list.
///
/// # Errors
/// Returns an error if the user does not exist or a database query fails.
pub async fn list_orders(db: &DatabaseConnection, user_id: i64) -> Result<Vec<PlacedOrder>> {
    require_user(db, user_id).await?;

    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|order| order.id).collect();
    let mut items_by_order: HashMap<i64, Vec<order_item::Model>> = HashMap::new();
    for item in OrderItem::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            PlacedOrder { order, items }
        })
        .collect())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::cart;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn line(item_id: &str, quantity: i32, unit_price: f64) -> LineItem {
        LineItem {
            item_id: item_id.to_string(),
            name: format!("Item {item_id}"),
            quantity,
            unit_price,
        }
    }

    fn new_order(items: Vec<LineItem>, declared: Option<f64>) -> NewOrder {
        NewOrder {
            items,
            address: sample_address(),
            declared_amount: declared,
        }
    }

    #[test]
    fn test_compute_total() {
        assert_eq!(compute_total(&[]), 0.0);
        assert_eq!(
            compute_total(&[line("m1", 2, 1.5), line("m2", 1, 2.0)]),
            5.0
        );
        assert_eq!(compute_total(&[line("m1", 3, 0.1)]), 0.3);
    }

    #[test]
    fn test_address_validation_lists_missing_fields() {
        let mut address = sample_address();
        address.street = String::new();
        address.phone = " ".to_string();

        let err = address.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("street"));
        assert!(message.contains("phone"));
        assert!(!message.contains("city"));
    }

    #[tokio::test]
    async fn test_place_order_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let settings = OrderConfig::default();

        // Missing amount
        let result = place_order(&db, 1, new_order(vec![line("m1", 1, 2.0)], None), &settings).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        // No items
        let result = place_order(&db, 1, new_order(Vec::new(), Some(0.0)), &settings).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        // Zero quantity
        let result =
            place_order(&db, 1, new_order(vec![line("m1", 0, 2.0)], Some(0.0)), &settings).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        // Negative unit price
        let result =
            place_order(&db, 1, new_order(vec![line("m1", 1, -2.0)], Some(-2.0)), &settings)
                .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        // Amount disagrees with the items
        let result =
            place_order(&db, 1, new_order(vec![line("m1", 2, 2.0)], Some(3.0)), &settings).await;
        assert!(matches!(
            result,
            Err(Error::AmountMismatch { declared, computed }) if declared == 3.0 && computed == 4.0
        ));

        // Incomplete address
        let mut order = new_order(vec![line("m1", 1, 2.0)], Some(2.0));
        order.address.country = String::new();
        let result = place_order(&db, 1, order, &settings).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_settles_cart() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        cart::add_item(&db, user.id, cart_item_input("m1", 1.5)).await?;
        cart::add_item(&db, user.id, cart_item_input("m1", 1.5)).await?;
        cart::add_item(&db, user.id, cart_item_input("m2", 2.0)).await?;

        let items = vec![line("m1", 2, 1.5), line("m2", 1, 2.0)];
        let placed = place_order(
            &db,
            user.id,
            new_order(items, Some(5.0)),
            &OrderConfig::default(),
        )
        .await?;

        assert_eq!(placed.order.user_id, user.id);
        assert_eq!(placed.order.amount, 5.0);
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].item_id, "m1");
        assert_eq!(placed.items[0].quantity, 2);
        assert_eq!(placed.address(), sample_address());

        // Settlement emptied the cart; an explicit clear afterwards is harmless
        assert!(cart::get_cart(&db, user.id).await?.is_empty());
        assert!(cart::clear_cart(&db, user.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_without_clearing_cart() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        cart::add_item(&db, user.id, cart_item_input("m1", 2.5)).await?;

        let settings = OrderConfig {
            clear_cart_on_settle: false,
            ..OrderConfig::default()
        };
        place_order(
            &db,
            user.id,
            new_order(vec![line("m1", 1, 2.5)], Some(2.5)),
            &settings,
        )
        .await?;

        assert_eq!(cart::get_cart(&db, user.id).await?.len(), 1);
        assert!(cart::clear_cart(&db, user.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_amount_within_tolerance_stores_recomputed_total() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let placed = place_order(
            &db,
            user.id,
            new_order(vec![line("m1", 3, 0.1)], Some(0.305)),
            &OrderConfig::default(),
        )
        .await?;
        assert_eq!(placed.order.amount, 0.3);

        Ok(())
    }

    #[tokio::test]
    async fn test_mismatch_writes_nothing() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        cart::add_item(&db, user.id, cart_item_input("m1", 2.5)).await?;

        let result = place_order(
            &db,
            user.id,
            new_order(vec![line("m1", 1, 2.5)], Some(0.5)),
            &OrderConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::AmountMismatch { .. })));

        assert!(list_orders(&db, user.id).await?.is_empty());
        assert_eq!(cart::get_cart(&db, user.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_for_missing_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = place_order(
            &db,
            404,
            new_order(vec![line("m1", 1, 2.5)], Some(2.5)),
            &OrderConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_empty_is_success() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        assert!(list_orders(&db, user.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_most_recent_first() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let other = create_custom_user(&db, "Other", "other@example.com").await?;
        let settings = OrderConfig::default();

        let first = place_order(
            &db,
            user.id,
            new_order(vec![line("m1", 1, 1.0)], Some(1.0)),
            &settings,
        )
        .await?;
        let second = place_order(
            &db,
            user.id,
            new_order(vec![line("m2", 2, 3.0), line("m3", 1, 1.0)], Some(7.0)),
            &settings,
        )
        .await?;
        place_order(
            &db,
            other.id,
            new_order(vec![line("m9", 1, 9.0)], Some(9.0)),
            &settings,
        )
        .await?;

        let orders = list_orders(&db, user.id).await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0], second);
        assert_eq!(orders[1], first);
        assert_eq!(orders[0].items.len(), 2);

        Ok(())
    }
}
