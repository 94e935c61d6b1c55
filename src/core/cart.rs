//! Cart business logic - Handles every mutation of a user's cart.
//!
//! A cart is the set of `cart_items` rows owned by one user. Each operation runs in a
//! storage transaction: it checks the owner exists, applies a single atomic SQL
//! statement, then re-reads the whole cart so the caller always sees the committed
//! state. Quantities are changed with `quantity = quantity ± 1` expressions instead of
//! read-modify-write, so concurrent requests for the same user cannot lose updates.
//!
//! Invariants maintained here:
//! - at most one entry per `(user_id, item_id)` (enforced by the primary key)
//! - `quantity >= 1` for every stored entry
//! - an entry's name, image and price are the ones supplied when it was first added
//! - `position` grows with every new entry of a cart and is kept on merge
//!
//! Item ids are trimmed by every operation before they reach storage.

use crate::{
    core::user::require_user,
    entities::{CartItem, cart_item},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info};

/// Item details supplied when adding to a cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    /// Catalog identifier, treated as opaque
    pub item_id: String,
    /// Display name
    pub name: String,
    /// Image URL
    pub image_url: String,
    /// Unit price
    pub price: f64,
}

impl NewCartItem {
    fn validate(&self) -> Result<()> {
        if self.item_id.trim().is_empty()
            || self.name.trim().is_empty()
            || self.image_url.trim().is_empty()
        {
            return Err(Error::invalid_argument(
                "All fields (id, name, imageUrl, price) are required",
            ));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidAmount { amount: self.price });
        }

        Ok(())
    }
}

/// Result of [`add_item`].
#[derive(Debug, Clone)]
pub struct AddedItem {
    /// True when the item was already in the cart and only its quantity grew
    pub merged: bool,
    /// The full cart after the change
    pub cart: Vec<cart_item::Model>,
}

/// Adds one unit of an item to the user's cart.
///
/// A new entry starts at quantity 1. If the cart already holds the item, its quantity
/// is incremented and the stored name, image and price are left as they were.
///
/// # Errors
/// Returns an error if:
/// - The item id, name or image URL is empty, or the price is negative or not finite
/// - The user does not exist
/// - A database operation fails
pub async fn add_item(
    db: &DatabaseConnection,
    user_id: i64,
    item: NewCartItem,
) -> Result<AddedItem> {
    item.validate()?;
    let item_id = item.item_id.trim().to_string();

    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let merged = CartItem::find_by_id((user_id, item_id.clone()))
        .one(&txn)
        .await?
        .is_some();
    let position = next_position(&txn, user_id).await?;

    let entry = cart_item::ActiveModel {
        user_id: Set(user_id),
        item_id: Set(item_id.clone()),
        name: Set(item.name.trim().to_string()),
        image_url: Set(item.image_url.trim().to_string()),
        price: Set(item.price),
        quantity: Set(1),
        added_at: Set(chrono::Utc::now()),
        position: Set(position),
    };

    // Insert-or-increment in one statement
    CartItem::insert(entry)
        .on_conflict(
            OnConflict::columns([cart_item::Column::UserId, cart_item::Column::ItemId])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col(cart_item::Column::Quantity).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let cart = load_cart(&txn, user_id).await?;
    txn.commit().await?;

    info!(
        "User {} added item {} to cart (merged: {})",
        user_id, item_id, merged
    );
    Ok(AddedItem { merged, cart })
}

/// Increments the quantity of an item already in the cart.
///
/// # Errors
/// Returns an error if the user does not exist, the item is not in the cart, or a
/// database operation fails.
pub async fn increase_quantity(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: &str,
) -> Result<Vec<cart_item::Model>> {
    let item_id = item_id.trim();
    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let updated = CartItem::update_many()
        .col_expr(
            cart_item::Column::Quantity,
            Expr::col(cart_item::Column::Quantity).add(1),
        )
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ItemId.eq(item_id))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        return Err(Error::CartItemNotFound {
            item_id: item_id.to_string(),
        });
    }

    let cart = load_cart(&txn, user_id).await?;
    txn.commit().await?;

    debug!("User {} increased quantity of {}", user_id, item_id);
    Ok(cart)
}

/// Decrements the quantity of an item in the cart.
///
/// The decrement never removes the entry: at quantity 1 it is refused with
/// [`Error::QuantityBelowMinimum`] and the cart is left unchanged. Use
/// [`remove_item`] to drop an entry.
///
/// # Errors
/// Returns an error if the user does not exist, the item is not in the cart, the
/// quantity is already 1, or a database operation fails.
pub async fn decrease_quantity(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: &str,
) -> Result<Vec<cart_item::Model>> {
    let item_id = item_id.trim();
    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let updated = CartItem::update_many()
        .col_expr(
            cart_item::Column::Quantity,
            Expr::col(cart_item::Column::Quantity).sub(1),
        )
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ItemId.eq(item_id))
        .filter(cart_item::Column::Quantity.gt(1))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        // Either the entry is missing or it sits at quantity 1
        let exists = CartItem::find_by_id((user_id, item_id.to_string()))
            .one(&txn)
            .await?
            .is_some();
        return Err(if exists {
            Error::QuantityBelowMinimum {
                item_id: item_id.to_string(),
            }
        } else {
            Error::CartItemNotFound {
                item_id: item_id.to_string(),
            }
        });
    }

    let cart = load_cart(&txn, user_id).await?;
    txn.commit().await?;

    debug!("User {} decreased quantity of {}", user_id, item_id);
    Ok(cart)
}

/// Removes an item from the cart. Removing an item that is not there succeeds.
///
/// # Errors
/// Returns an error if the user does not exist or a database operation fails.
pub async fn remove_item(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: &str,
) -> Result<Vec<cart_item::Model>> {
    let item_id = item_id.trim();
    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let deleted = CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ItemId.eq(item_id))
        .exec(&txn)
        .await?;

    let cart = load_cart(&txn, user_id).await?;
    txn.commit().await?;

    debug!(
        "User {} removed item {} ({} rows)",
        user_id, item_id, deleted.rows_affected
    );
    Ok(cart)
}

/// Returns the user's cart in insertion order.
///
/// # Errors
/// Returns an error if the user does not exist or the database query fails.
pub async fn get_cart(db: &DatabaseConnection, user_id: i64) -> Result<Vec<cart_item::Model>> {
    require_user(db, user_id).await?;
    load_cart(db, user_id).await
}

/// Empties the user's cart. Clearing an empty cart succeeds.
///
/// # Errors
/// Returns an error if the user does not exist or a database operation fails.
pub async fn clear_cart(db: &DatabaseConnection, user_id: i64) -> Result<Vec<cart_item::Model>> {
    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    delete_cart_entries(&txn, user_id).await?;
    let cart = load_cart(&txn, user_id).await?;
    txn.commit().await?;

    info!("User {} cleared cart", user_id);
    Ok(cart)
}

/// Deletes every entry of a user's cart, returning how many were removed.
///
/// Generic over the connection so order settlement can clear the cart inside its
/// own transaction.
pub(crate) async fn delete_cart_entries<C>(db: &C, user_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let deleted = CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(deleted.rows_affected)
}

/// Position for the next entry of a cart. Runs inside the caller's transaction.
async fn next_position<C>(db: &C, user_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let last: Option<Option<i64>> = CartItem::find()
        .select_only()
        .column_as(cart_item::Column::Position.max(), "last")
        .filter(cart_item::Column::UserId.eq(user_id))
        .into_tuple()
        .one(db)
        .await?;
    Ok(last.flatten().unwrap_or(0) + 1)
}

async fn load_cart<C>(db: &C, user_id: i64) -> Result<Vec<cart_item::Model>>
where
    C: ConnectionTrait,
{
    CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .order_by_asc(cart_item::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}
